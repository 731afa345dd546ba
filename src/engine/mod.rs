// src/engine/mod.rs

//! Orchestration engine for releasedag.
//!
//! This module ties together:
//! - the per-stage DAG scheduler
//! - the runtime event loop that reacts to task start/completion events
//!   coming back from the executor
//! - the [`Runner`], which resolves requests and drives stages in order
//!
//! The pure state machine lives in [`crate::dag::scheduler`]; the async/IO
//! shell is implemented in [`runtime`].

use std::num::NonZeroUsize;

use crate::types::TaskName;

/// Outcome of a unit of work as seen by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed,
}

impl<T, E> From<&std::result::Result<T, E>> for TaskOutcome {
    fn from(result: &std::result::Result<T, E>) -> Self {
        match result {
            Ok(_) => TaskOutcome::Success,
            Err(_) => TaskOutcome::Failed,
        }
    }
}

/// Options passed to the runner for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    /// When false, failures of tasks marked `lenient` are logged and
    /// treated as success (used while watching).
    pub strict: bool,
    /// Maximum number of units of work in flight; `None` = unlimited.
    pub jobs: Option<NonZeroUsize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            strict: true,
            jobs: None,
        }
    }
}

/// Events flowing into the runtime from the executor.
#[derive(Debug)]
pub enum RuntimeEvent {
    /// A task's unit of work began.
    TaskStarted { task: TaskName },
    /// A task's unit of work finished; `result` is its completion signal.
    TaskCompleted {
        task: TaskName,
        result: anyhow::Result<()>,
    },
}

/// What happened during a successful invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Tasks in the order their units of work started.
    pub started: Vec<TaskName>,
    /// Tasks in the order their units of work completed successfully
    /// (downgraded lenient failures included).
    pub completed: Vec<TaskName>,
    /// Lenient tasks that failed but were treated as success.
    pub downgraded: Vec<TaskName>,
}

impl RunReport {
    /// Whether `task`'s unit of work ran during this invocation.
    pub fn ran(&self, task: &str) -> bool {
        self.started.iter().any(|t| t == task)
    }

    /// Append another stage's report.
    pub fn absorb(&mut self, other: RunReport) {
        self.started.extend(other.started);
        self.completed.extend(other.completed);
        self.downgraded.extend(other.downgraded);
    }
}

pub mod runner;
pub mod runtime;

pub use runner::Runner;
pub use runtime::Runtime;
