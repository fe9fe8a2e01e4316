/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/processor.rs
 * Responsibility: Turn one log-file modification into at most one decloak alert.
 */

use crate::alert::Notifier;
use crate::config::Config;
use crate::dedup::DedupState;
use crate::listener::resolve_listener;
use crate::matcher::{find_latest_trigger, TriggerLine};
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, info};

/// How a single modification event ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Not a game log (wrong extension).
    Skipped,
    /// No unfiltered decloak line in the file.
    NoMatch,
    /// Newest decloak line was already alerted.
    Duplicate,
    /// Decloak found but the file names no listener.
    Unresolved,
    Notified { listener: String, sends: u32 },
    DeliveryFailed { listener: String, error: String },
}

pub struct EventProcessor {
    config: Arc<RwLock<Config>>,
    dedup: DedupState,
    notifier: Notifier,
}

pub(crate) fn has_log_extension(path: &Path, extension: &str) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some(extension.trim_start_matches('.'))
}

/// Whole file as lines; invalid UTF-8 is replaced rather than rejected.
pub async fn read_log_lines(path: &Path) -> anyhow::Result<Vec<String>> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read log file {:?}", path))?;
    Ok(String::from_utf8_lossy(&bytes).lines().map(str::to_string).collect())
}

impl EventProcessor {
    pub fn new(config: Arc<RwLock<Config>>, notifier: Notifier) -> Self {
        Self {
            config,
            dedup: DedupState::new(),
            notifier,
        }
    }

    pub fn config(&self) -> &Arc<RwLock<Config>> {
        &self.config
    }

    pub fn dedup(&self) -> &DedupState {
        &self.dedup
    }

    /// Errors only when the file cannot be read; dedup state is untouched then.
    pub async fn process(&self, path: &Path) -> anyhow::Result<Outcome> {
        let config = self.config.read().await.clone();

        if !has_log_extension(path, &config.watch.extension) {
            return Ok(Outcome::Skipped);
        }

        let lines = read_log_lines(path).await?;

        let Some(trigger) = find_latest_trigger(&lines, &config.ignore) else {
            return Ok(Outcome::NoMatch);
        };

        if !self.claim(path, &trigger, &config) {
            debug!("Duplicate decloak in {:?}: {}", path, trigger.line);
            return Ok(Outcome::Duplicate);
        }

        let Some(listener) = resolve_listener(&lines) else {
            debug!("Decloak in {:?} but no Listener line; dropping", path);
            return Ok(Outcome::Unresolved);
        };

        info!("👁️ Decloak detected for {} in {:?}", listener, path.file_name().unwrap_or_default());

        match self.notifier.notify(&listener, &config.notification).await {
            Ok(sends) => Ok(Outcome::Notified { listener, sends }),
            Err(e) => {
                error!("❌ Decloak alert for {} not delivered: {:#}", listener, e);
                Ok(Outcome::DeliveryFailed {
                    listener,
                    error: format!("{:#}", e),
                })
            }
        }
    }

    /// Records the trigger before anything is sent. Keyless triggers always pass.
    fn claim(&self, path: &Path, trigger: &TriggerLine, config: &Config) -> bool {
        match trigger.dedup_key(config.watch.untimestamped) {
            Some(key) => self.dedup.observe(path, &key),
            None => true,
        }
    }
}
