/*
 * Cloakwatch - Decloak Alert Relay
 * File Path: src/watch.rs
 * Responsibility: The Watchman. Observes the game log directory and feeds modifications to the processor.
 */

use crate::processor::{EventProcessor, Outcome};
use anyhow::Context;
use notify::{Watcher, RecursiveMode, EventKind, RecommendedWatcher, event::{ModifyKind, CreateKind}};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

fn is_relevant_fs_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Create(CreateKind::Any)
            | EventKind::Create(CreateKind::File)
    )
}

/// A running directory subscription plus the task that drains it.
/// Events are handled one at a time, each to completion.
pub struct FileWatcher {
    dir: PathBuf,
    watcher: RecommendedWatcher,
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<()>,
}

impl FileWatcher {
    /// Must be called inside a tokio runtime.
    pub fn start(dir: &Path, processor: Arc<EventProcessor>) -> anyhow::Result<Self> {
        let (fs_tx, mut fs_rx) = mpsc::channel::<notify::Event>(100);
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) => {
                    let _ = fs_tx.blocking_send(event);
                }
                Err(e) => warn!("⚠️ Filesystem watch error: {}", e),
            }
        })
        .context("Failed to create filesystem watcher")?;

        watcher
            .watch(dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch log directory {:?}", dir))?;

        let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = &mut shutdown_rx => break,
                    Some(event) = fs_rx.recv() => {
                        if !is_relevant_fs_event(&event.kind) {
                            continue;
                        }
                        for path in event.paths {
                            handle_path(&processor, &path).await;
                        }
                    },
                    else => break,
                }
            }
        });

        info!("👁️ The Watchman is observing {:?}", dir);
        Ok(Self {
            dir: dir.to_path_buf(),
            watcher,
            shutdown,
            task,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Lets the in-flight event finish, joins the task, then unsubscribes.
    ///
    /// The notify thread may be parked in `blocking_send` on a full channel;
    /// the receiver is dropped when the task exits, which releases it before
    /// the watcher is torn down off the async executor.
    pub async fn stop(self) {
        let FileWatcher { dir, watcher, shutdown, task } = self;
        let _ = shutdown.send(());
        if let Err(e) = task.await {
            error!("❌ Watchman task ended abnormally: {:?}", e);
        }
        if let Err(e) = tokio::task::spawn_blocking(move || drop(watcher)).await {
            error!("❌ Failed to release filesystem watcher: {:?}", e);
        }
        info!("🛑 The Watchman stopped observing {:?}", dir);
    }
}

async fn handle_path(processor: &EventProcessor, path: &Path) {
    match processor.process(path).await {
        Ok(Outcome::Skipped) | Ok(Outcome::NoMatch) => {}
        Ok(outcome) => debug!("{:?} -> {:?}", path.file_name().unwrap_or_default(), outcome),
        Err(e) => warn!("⚠️ Skipping modification of {:?}: {:#}", path, e),
    }
}
