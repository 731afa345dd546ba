// src/exec/context.rs

//! Per-invocation context handed to every unit of work.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::process::Child;
use tracing::{debug, info, warn};

use crate::exec::browser::{SystemOpener, UrlOpener};
use crate::types::{BumpKind, TaskName};

/// Values a unit of work may consume: the project root and the
/// command-line flags aimed at individual tasks.
#[derive(Debug, Clone)]
pub struct TaskContext {
    /// Name of the task being executed (empty on the base context).
    pub task: TaskName,
    /// Directory commands run in and relative paths resolve against.
    pub root: PathBuf,
    /// `--type` flag, consumed by bump tasks.
    pub bump: Option<BumpKind>,
    /// `--open` flag: long-lived tasks with a URL open it once ready.
    pub open: bool,
    /// Used to open URLs when `open` is set.
    pub opener: Arc<dyn UrlOpener>,
    /// Keeps long-lived processes alive after their task completed.
    pub keeper: ProcessKeeper,
}

impl TaskContext {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            task: TaskName::new(),
            root: root.into(),
            bump: None,
            open: false,
            opener: Arc::new(SystemOpener),
            keeper: ProcessKeeper::default(),
        }
    }

    pub fn with_bump(mut self, bump: Option<BumpKind>) -> Self {
        self.bump = bump;
        self
    }

    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    pub fn with_opener(mut self, opener: Arc<dyn UrlOpener>) -> Self {
        self.opener = opener;
        self
    }

    /// Copy of this context scoped to one task.
    pub fn for_task(&self, task: &str) -> Self {
        let mut ctx = self.clone();
        ctx.task = task.to_string();
        ctx
    }

    /// Resolve a possibly-relative path against the project root.
    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Default for TaskContext {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Shared owner of processes started by long-lived tasks.
///
/// Children are spawned with `kill_on_drop`, so dropping the last clone of
/// the keeper stops them.
#[derive(Debug, Clone, Default)]
pub struct ProcessKeeper {
    children: Arc<Mutex<Vec<(TaskName, Child)>>>,
}

impl ProcessKeeper {
    pub fn keep(&self, task: &str, child: Child) {
        debug!(task = %task, pid = child.id(), "keeping long-lived process");
        match self.children.lock() {
            Ok(mut guard) => guard.push((task.to_string(), child)),
            Err(poisoned) => poisoned.into_inner().push((task.to_string(), child)),
        }
    }

    pub fn len(&self) -> usize {
        match self.children.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kill every kept process.
    pub async fn shutdown(&self) {
        let children = match self.children.lock() {
            Ok(mut guard) => std::mem::take(&mut *guard),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        for (task, mut child) in children {
            info!(task = %task, "stopping long-lived process");
            if let Err(e) = child.kill().await {
                warn!(task = %task, error = %e, "failed to kill long-lived process");
            }
        }
    }
}
