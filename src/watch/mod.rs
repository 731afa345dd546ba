// src/watch/mod.rs

//! File watching for `--watch`.
//!
//! This module is responsible for:
//! - Compiling `[[watch]]` path / exclude glob patterns.
//! - Wiring up a cross-platform filesystem watcher (`notify`).
//! - Running the triggered tasks as one group, non-strictly, until shutdown.
//!
//! It does not decide what a failure means: that is the runner's job, driven
//! by the [`RunOptions`](crate::engine::RunOptions) it was given.

pub mod path_utils;
pub mod patterns;
pub mod watcher;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::dag::Group;
use crate::engine::Runner;
use crate::types::TaskName;

pub use patterns::{WatchProfile, build_profiles, tasks_for_path};
pub use watcher::{WatchTrigger, WatcherHandle, spawn_watcher};

/// Quiet period used to merge bursts of file events into one run.
pub const DEBOUNCE: Duration = Duration::from_millis(200);

/// Watch `root` and run triggered tasks with `runner` until `shutdown`
/// resolves.
///
/// Failures are logged and watching continues.
pub async fn watch_and_run<S>(
    runner: &Runner,
    root: impl Into<PathBuf>,
    profiles: Vec<WatchProfile>,
    shutdown: S,
) -> Result<()>
where
    S: Future<Output = ()>,
{
    if profiles.is_empty() {
        warn!("--watch given but the config has no [[watch]] rules; waiting for Ctrl-C");
    }

    let (tx, mut rx) = mpsc::unbounded_channel();
    let _handle = spawn_watcher(root, profiles, tx)?;

    tokio::pin!(shutdown);

    loop {
        let first = tokio::select! {
            _ = &mut shutdown => break,
            trigger = rx.recv() => match trigger {
                Some(trigger) => trigger,
                None => break,
            },
        };

        let batch = collect_batch(first, &mut rx, DEBOUNCE).await;
        info!(paths = ?batch.paths, tasks = ?batch.tasks, "change detected");

        match runner.run_sequence([Group::new(batch.tasks)]).await {
            Ok(report) => {
                if !report.downgraded.is_empty() {
                    warn!(tasks = ?report.downgraded, "finished with ignored failures");
                } else {
                    info!("finished; watching for changes");
                }
            }
            Err(err) => warn!(error = %err, "run failed; watching for changes"),
        }
    }

    info!("stopped watching");
    Ok(())
}

/// Paths and tasks accumulated from one burst of triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerBatch {
    pub paths: Vec<String>,
    pub tasks: Vec<TaskName>,
}

impl TriggerBatch {
    pub fn push(&mut self, trigger: WatchTrigger) {
        if !self.paths.contains(&trigger.path) {
            self.paths.push(trigger.path);
        }
        for task in trigger.tasks {
            if !self.tasks.contains(&task) {
                self.tasks.push(task);
            }
        }
    }
}

/// Merge `first` with everything that arrives until `quiet` passes without
/// a new trigger.
pub async fn collect_batch(
    first: WatchTrigger,
    rx: &mut mpsc::UnboundedReceiver<WatchTrigger>,
    quiet: Duration,
) -> TriggerBatch {
    let mut batch = TriggerBatch::default();
    batch.push(first);

    while let Ok(Some(next)) = tokio::time::timeout(quiet, rx.recv()).await {
        batch.push(next);
    }

    batch
}
