use async_trait::async_trait;
use cloakwatch::{WebhookPayload, WebhookSink};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Captures outbound payloads instead of posting them.
#[derive(Default)]
pub struct RecordingSink {
    pub sent: Mutex<Vec<String>>,
    pub started: AtomicUsize,
    pub delay: Option<Duration>,
}

impl RecordingSink {
    pub fn slow(delay: Duration) -> Self {
        Self { delay: Some(delay), ..Default::default() }
    }

    pub fn messages(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookSink for RecordingSink {
    async fn post(&self, _url: &str, payload: &WebhookPayload) -> anyhow::Result<()> {
        self.started.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.sent.lock().unwrap().push(payload.content.clone());
        Ok(())
    }
}

pub const HEADER: &str = "------------------------------------------------------------\n  Gamelog\n  Listener: Alice\n  Session Started: 2024.01.01 09:00:00\n------------------------------------------------------------\n";
