/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/monitor.rs
 * Responsibility: Monitor context. Owns config, dedup memory, notifier and the single watcher.
 */

use crate::alert::Notifier;
use crate::config::Config;
use crate::init::default_log_dir;
use crate::processor::{EventProcessor, Outcome};
use crate::watch::FileWatcher;
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::info;

/// Entry point for callers (CLI, tests, a future settings UI): start, stop,
/// apply config, or push a single event through the pipeline.
pub struct Monitor {
    processor: Arc<EventProcessor>,
    watcher: Mutex<Option<FileWatcher>>,
    log_dir_override: Option<PathBuf>,
}

impl Monitor {
    pub fn new(config: Config, notifier: Notifier) -> Self {
        let processor = EventProcessor::new(Arc::new(RwLock::new(config)), notifier);
        Self {
            processor: Arc::new(processor),
            watcher: Mutex::new(None),
            log_dir_override: None,
        }
    }

    /// Session-only log directory; never written back into the config.
    pub fn with_log_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.log_dir_override = dir;
        self
    }

    pub fn processor(&self) -> &EventProcessor {
        &self.processor
    }

    pub async fn config(&self) -> Config {
        self.processor.config().read().await.clone()
    }

    /// Takes effect from the next processed event.
    pub async fn apply_config(&self, config: Config) {
        *self.processor.config().write().await = config;
        info!("🔧 Configuration applied");
    }

    pub async fn log_dir(&self) -> PathBuf {
        if let Some(dir) = &self.log_dir_override {
            return dir.clone();
        }
        self.config().await.watch.log_dir.unwrap_or_else(default_log_dir)
    }

    /// No-op when already running.
    pub async fn start(&self) -> anyhow::Result<()> {
        let mut slot = self.watcher.lock().await;
        if slot.is_some() {
            return Ok(());
        }

        let dir = self.log_dir().await;
        if !dir.is_dir() {
            anyhow::bail!("Log directory {:?} does not exist", dir);
        }

        let watcher = FileWatcher::start(&dir, self.processor.clone())
            .with_context(|| format!("Failed to start monitoring {:?}", dir))?;
        *slot = Some(watcher);
        info!("🚀 Monitoring started.");
        Ok(())
    }

    /// No-op when not running. Returns once the delivery task has exited.
    pub async fn stop(&self) {
        let watcher = self.watcher.lock().await.take();
        if let Some(watcher) = watcher {
            watcher.stop().await;
            info!("Monitoring stopped.");
        }
    }

    pub async fn is_running(&self) -> bool {
        self.watcher.lock().await.is_some()
    }

    pub async fn process_event(&self, path: &Path) -> anyhow::Result<Outcome> {
        self.processor.process(path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::tests::RecordingSink;
    use tempfile::tempdir;

    fn monitor_for(dir: &Path) -> Monitor {
        let mut config = Config::default();
        config.watch.log_dir = Some(dir.to_path_buf());
        Monitor::new(config, Notifier::new(Arc::new(RecordingSink::default())))
    }

    #[tokio::test]
    async fn test_start_is_idempotent_and_stop_tolerates_idle() {
        let dir = tempdir().unwrap();
        let monitor = monitor_for(dir.path());

        monitor.stop().await;
        assert!(!monitor.is_running().await);

        monitor.start().await.unwrap();
        monitor.start().await.unwrap();
        assert!(monitor.is_running().await);

        monitor.stop().await;
        monitor.stop().await;
        assert!(!monitor.is_running().await);
    }

    #[tokio::test]
    async fn test_start_fails_for_missing_directory() {
        let dir = tempdir().unwrap();
        let monitor = monitor_for(&dir.path().join("nope"));
        assert!(monitor.start().await.is_err());
        assert!(!monitor.is_running().await);
    }

    #[tokio::test]
    async fn test_apply_config_swaps_snapshot() {
        let dir = tempdir().unwrap();
        let monitor = monitor_for(dir.path());

        let mut config = monitor.config().await;
        config.ignore.stations = true;
        monitor.apply_config(config).await;
        assert!(monitor.config().await.ignore.stations);
        assert_eq!(monitor.log_dir().await, dir.path());
    }

    #[tokio::test]
    async fn test_log_dir_override_stays_out_of_config() {
        let dir = tempdir().unwrap();
        let other = tempdir().unwrap();
        let monitor = monitor_for(dir.path()).with_log_dir(Some(other.path().to_path_buf()));

        assert_eq!(monitor.log_dir().await, other.path());
        assert_eq!(monitor.config().await.watch.log_dir.as_deref(), Some(dir.path()));

        // Survives a live config swap.
        monitor.apply_config(Config::default()).await;
        assert_eq!(monitor.log_dir().await, other.path());
        assert_eq!(monitor.config().await.watch.log_dir, None);

        monitor.start().await.unwrap();
        assert!(monitor.is_running().await);
        monitor.stop().await;
    }
}
