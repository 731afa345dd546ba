// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::types::TaskName;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::{WatchProfile, tasks_for_path};

/// A changed path and the tasks its `[[watch]]` rules asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchTrigger {
    /// Path relative to the project root, with forward slashes.
    pub path: String,
    pub tasks: Vec<TaskName>,
}

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive. Dropping this handle
/// stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Spawn a filesystem watcher that observes `root` recursively and sends a
/// [`WatchTrigger`] for every changed path that matches at least one
/// profile.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profiles: Vec<WatchProfile>,
    trigger_tx: mpsc::UnboundedSender<WatchTrigger>,
) -> Result<WatcherHandle> {
    let root = root.into();
    let root = root.canonicalize().unwrap_or(root);
    let profiles = Arc::new(profiles);

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("releasedag: failed to forward notify event: {err}");
                }
            }
            Err(err) => {
                eprintln!("releasedag: file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;

    info!(root = %root.display(), rules = profiles.len(), "file watcher started");

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            if !is_content_change(&event.kind) {
                continue;
            }
            debug!(?event, "received notify event");

            for path in &event.paths {
                let Some(rel) = relative_str(&root, path) else {
                    continue;
                };
                let tasks = tasks_for_path(&profiles, &rel);
                if tasks.is_empty() {
                    continue;
                }
                debug!(path = %rel, ?tasks, "watched path changed");
                if trigger_tx.send(WatchTrigger { path: rel, tasks }).is_err() {
                    warn!("watch trigger receiver dropped; stopping watcher loop");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

fn is_content_change(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_) | EventKind::Any
    )
}
