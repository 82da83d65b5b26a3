//! Filesystem watcher that keeps the manifest current.
//!
//! DESIGN
//! ======
//! The `notify` callback runs on the watcher's own thread and only forwards
//! events into an unbounded tokio channel. A single task drains that channel,
//! coalesces bursts over a short debounce window (a copied element directory
//! produces one event per file), rescans on a blocking thread, rewrites the
//! generated file, and publishes the new value through `tokio::sync::watch`.
//! One task means one writer in this process; writes from other processes
//! still resolve as last write wins.
//!
//! Only structural changes matter: creates, removes, and renames at most two
//! levels below the root (element folders and the files directly in them).
//! Dot-paths are ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::{Manifest, ManifestError, scan};

/// Watched depth below the elements root.
const WATCH_DEPTH: usize = 2;

/// Quiet period after the first relevant event before rescanning.
const DEBOUNCE: Duration = Duration::from_millis(100);

pub struct ManifestWatcher {
    rx: watch::Receiver<Manifest>,
    watcher: Option<RecommendedWatcher>,
    task: JoinHandle<()>,
}

impl ManifestWatcher {
    /// Generate the manifest once, then start watching `root`.
    ///
    /// A missing root is not fatal: the initial manifest is empty and no
    /// watcher is installed. Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Watch` when the OS watcher cannot be created or attached.
    pub fn spawn(root: PathBuf, output: PathBuf) -> Result<Self, ManifestError> {
        let root = std::fs::canonicalize(&root).unwrap_or(root);
        let initial = match scan::regenerate(&root, &output) {
            Ok(manifest) => manifest,
            Err(e) => {
                error!(error = %e, "initial manifest generation failed");
                Manifest::default()
            }
        };
        let (tx, rx) = watch::channel(initial);
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let watcher = if root.is_dir() {
            let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event_tx.send(event).is_err() {
                        debug!("manifest task gone; dropping filesystem event");
                    }
                }
                Err(e) => error!(error = %e, "watcher error"),
            })?;
            watcher.watch(&root, RecursiveMode::Recursive)?;
            info!(root = %root.display(), "watching for element changes");
            Some(watcher)
        } else {
            warn!(root = %root.display(), "elements directory missing; manifest will not be watched");
            None
        };

        let task = tokio::spawn(run(root, output, event_rx, tx));
        Ok(Self { rx, watcher, task })
    }

    /// Receiver that always yields the latest manifest.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Manifest> {
        self.rx.clone()
    }

    #[must_use]
    pub fn current(&self) -> Manifest {
        self.rx.borrow().clone()
    }

    /// Stop watching and wait for the regeneration task to finish.
    pub async fn shutdown(self) {
        drop(self.watcher);
        if let Err(e) = self.task.await {
            warn!(error = %e, "manifest task ended abnormally");
        }
        info!("stopped element watcher");
    }
}

async fn run(
    root: PathBuf,
    output: PathBuf,
    mut events: mpsc::UnboundedReceiver<Event>,
    tx: watch::Sender<Manifest>,
) {
    while let Some(event) = events.recv().await {
        if !is_relevant(&root, &event) {
            continue;
        }
        debug!(kind = ?event.kind, paths = ?event.paths, "element tree changed");
        let coalesced = settle(&mut events, DEBOUNCE).await;
        debug!(coalesced, "rescanning element tree");
        refresh(&root, &output, &tx).await;
    }
}

/// Wait out `window`, then discard every event queued during it.
/// Returns how many were discarded.
pub(crate) async fn settle(events: &mut mpsc::UnboundedReceiver<Event>, window: Duration) -> usize {
    tokio::time::sleep(window).await;
    let mut coalesced = 0;
    while let Ok(extra) = events.try_recv() {
        debug!(kind = ?extra.kind, "coalesced filesystem event");
        coalesced += 1;
    }
    coalesced
}

/// Rescan and publish. Failures keep the previous value and file.
pub(crate) async fn refresh(root: &Path, output: &Path, tx: &watch::Sender<Manifest>) {
    let (root_owned, output_owned) = (root.to_path_buf(), output.to_path_buf());
    let result = tokio::task::spawn_blocking(move || scan::regenerate(&root_owned, &output_owned)).await;
    match result {
        Ok(Ok(manifest)) => {
            tx.send_if_modified(|current| {
                if *current == manifest {
                    false
                } else {
                    *current = manifest;
                    true
                }
            });
        }
        Ok(Err(e)) => error!(error = %e, "error generating manifest"),
        Err(e) => error!(error = %e, "manifest regeneration task failed"),
    }
}

/// Whether an event can change the manifest.
pub(crate) fn is_relevant(root: &Path, event: &Event) -> bool {
    let structural = matches!(event.kind, EventKind::Create(_) | EventKind::Remove(_) | EventKind::Modify(ModifyKind::Name(_)));
    structural && event.paths.iter().any(|path| is_watched_path(root, path))
}

fn is_watched_path(root: &Path, path: &Path) -> bool {
    let Ok(relative) = path.strip_prefix(root) else {
        return false;
    };
    let parts: Vec<_> = relative.components().collect();
    !parts.is_empty()
        && parts.len() <= WATCH_DEPTH
        && parts.iter().all(|part| !part.as_os_str().to_string_lossy().starts_with('.'))
}

#[cfg(test)]
#[path = "watch_test.rs"]
mod tests;
