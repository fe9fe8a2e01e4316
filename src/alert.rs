/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/alert.rs
 * Responsibility: Compose decloak alerts and deliver them to a Discord webhook.
 */

use crate::config::{CustomMessageConfig, MentionConfig, NotificationConfig, DEFAULT_TEMPLATE};
use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

pub const CHARNAME_PLACEHOLDER: &str = "{CHARNAME}";

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct WebhookPayload {
    pub content: String,
}

/// Where composed alerts go. One call is one outbound request.
#[async_trait]
pub trait WebhookSink: Send + Sync {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> anyhow::Result<()>;
}

/// Plain JSON POST; any non-2xx status is a failure.
pub struct DiscordWebhook {
    client: reqwest::Client,
}

impl DiscordWebhook {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("cloakwatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create webhook client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSink for DiscordWebhook {
    async fn post(&self, url: &str, payload: &WebhookPayload) -> anyhow::Result<()> {
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .context("Webhook request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Webhook returned {}: {}", status, body);
        }
        Ok(())
    }
}

/// `@everyone`, `@here`, role, user; in that order, space-joined.
pub fn build_mention_prefix(mentions: &MentionConfig) -> String {
    let mut tokens = Vec::new();
    if mentions.everyone {
        tokens.push("@everyone".to_string());
    }
    if mentions.here {
        tokens.push("@here".to_string());
    }
    if mentions.role && !mentions.role_id.is_empty() {
        tokens.push(format!("<@&{}>", mentions.role_id));
    }
    if mentions.user && !mentions.user_id.is_empty() {
        tokens.push(format!("<@{}>", mentions.user_id));
    }
    tokens.join(" ")
}

pub fn build_body(character_name: &str, custom: &CustomMessageConfig) -> String {
    let template = if custom.enabled { custom.template.as_str() } else { DEFAULT_TEMPLATE };
    template.replace(CHARNAME_PLACEHOLDER, character_name)
}

pub fn compose_message(character_name: &str, config: &NotificationConfig) -> String {
    let prefix = build_mention_prefix(&config.mentions);
    let body = build_body(character_name, &config.custom_message);
    if prefix.is_empty() {
        body
    } else {
        format!("{} {}", prefix, body)
    }
}

#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn WebhookSink>,
}

impl Notifier {
    pub fn new(sink: Arc<dyn WebhookSink>) -> Self {
        Self { sink }
    }

    pub fn discord() -> anyhow::Result<Self> {
        Ok(Self::new(Arc::new(DiscordWebhook::new()?)))
    }

    /// Sends the alert once, or `multi_ping.count` times. Stops at the first
    /// failed send and returns it unlogged; callers report it.
    pub async fn notify(&self, character_name: &str, config: &NotificationConfig) -> anyhow::Result<u32> {
        let payload = WebhookPayload {
            content: compose_message(character_name, config),
        };
        let repeats = config.multi_ping.repeats();

        for attempt in 1..=repeats {
            self.sink
                .post(&config.webhook_url, &payload)
                .await
                .with_context(|| format!("send {}/{} failed", attempt, repeats))?;
        }

        info!("📢 Decloak alert sent for {} ({}x)", character_name, repeats);
        Ok(repeats)
    }
}
