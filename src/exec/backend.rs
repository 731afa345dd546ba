// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning units of
//! work itself. This makes it easy to swap in a fake executor in tests while
//! keeping the production executor here.
//!
//! - `RealExecutorBackend` runs each task's [`Action`](crate::exec::Action)
//!   in its own Tokio task and reports `TaskStarted` / `TaskCompleted` events.
//! - Tests can provide their own `ExecutorBackend` that, for example, records
//!   which tasks were scheduled and directly emits `TaskCompleted` events.

use std::future::Future;
use std::pin::Pin;

use anyhow::anyhow;
use tokio::sync::mpsc;
use tracing::{debug, error};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::exec::context::TaskContext;

/// Trait abstracting how scheduled tasks are executed.
///
/// Production code uses [`RealExecutorBackend`]; tests can provide their own
/// implementation that doesn't run real units of work.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution.
    ///
    /// Every dispatched task must eventually produce exactly one
    /// `RuntimeEvent::TaskCompleted`, otherwise the runtime waits forever.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Real executor backend used in production.
pub struct RealExecutorBackend {
    tx: mpsc::Sender<RuntimeEvent>,
    ctx: TaskContext,
}

impl RealExecutorBackend {
    /// Create a backend reporting to the given runtime event sender.
    ///
    /// `ctx` is the base context; each task receives a copy scoped to it.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>, ctx: TaskContext) -> Self {
        Self { tx: runtime_tx, ctx }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            for task in tasks {
                spawn_unit_of_work(task, self.ctx.clone(), self.tx.clone());
            }
            Ok(())
        })
    }
}

/// Run one task's unit of work on its own Tokio task.
///
/// The action runs inside a nested `tokio::spawn` so that a panic is caught
/// by its `JoinHandle` and reported as an ordinary failure.
fn spawn_unit_of_work(task: ScheduledTask, base: TaskContext, tx: mpsc::Sender<RuntimeEvent>) {
    tokio::spawn(async move {
        let ScheduledTask { name, action, .. } = task;
        let ctx = base.for_task(&name);

        if tx
            .send(RuntimeEvent::TaskStarted { task: name.clone() })
            .await
            .is_err()
        {
            debug!(task = %name, "runtime gone before task started; skipping");
            return;
        }

        let handle = tokio::spawn(async move { action.execute(&ctx).await });

        let result = match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                error!(task = %name, error = %join_err, "unit of work panicked");
                Err(anyhow!("unit of work panicked: {join_err}"))
            }
        };

        if tx
            .send(RuntimeEvent::TaskCompleted {
                task: name.clone(),
                result,
            })
            .await
            .is_err()
        {
            debug!(task = %name, "runtime gone before completion could be reported");
        }
    });
}
