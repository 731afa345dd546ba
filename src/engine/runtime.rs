// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::{ScheduledTask, Scheduler};
use crate::errors::{ReleasedagError, Result};
use crate::exec::ExecutorBackend;
use crate::types::TaskName;

use super::{RunReport, RuntimeEvent, TaskOutcome};

/// Drives one stage's [`Scheduler`] in response to `RuntimeEvent`s and
/// delegates the actual units of work to an `ExecutorBackend`.
///
/// The scheduler holds all the semantics. This struct only handles async
/// IO: reading events from the channel and dispatching tasks.
pub struct Runtime<E: ExecutorBackend> {
    scheduler: Scheduler,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("scheduler", &self.scheduler)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(scheduler: Scheduler, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            scheduler,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// Dispatches the stage's leaves, then feeds every completion into the
    /// scheduler until nothing is running and nothing more will start.
    /// Returns the first failure once all in-flight work has settled.
    pub async fn run(mut self) -> Result<RunReport> {
        let stage = self.scheduler.stage();
        info!(stage, "stage started");

        let mut report = RunReport::default();
        let mut first_failure: Option<(TaskName, anyhow::Error)> = None;

        let ready = self.scheduler.start();
        self.spawn_ready(ready).await?;

        while !self.scheduler.is_finished() {
            let Some(event) = self.event_rx.recv().await else {
                warn!(stage, "runtime event channel closed with work outstanding");
                return Err(ReleasedagError::Other(anyhow::anyhow!(
                    "executor stopped reporting before stage {stage} finished"
                )));
            };

            debug!(?event, "runtime received event");

            match event {
                RuntimeEvent::TaskStarted { task } => report.started.push(task),
                RuntimeEvent::TaskCompleted { task, result } => {
                    let outcome = TaskOutcome::from(&result);
                    let step = self.scheduler.step_completion(&task, outcome);

                    match result {
                        Ok(()) => report.completed.push(task),
                        Err(cause) => {
                            if step.newly_failed.iter().any(|t| t == &task) {
                                if first_failure.is_none() {
                                    first_failure = Some((task, cause));
                                } else {
                                    warn!(task = %task, error = %format!("{cause:#}"), "additional task failure");
                                }
                            } else if self.scheduler.downgraded().contains(&task) {
                                warn!(task = %task, error = %format!("{cause:#}"), "ignored failure of lenient task");
                                report.completed.push(task.clone());
                                report.downgraded.push(task);
                            }
                        }
                    }

                    self.spawn_ready(step.newly_scheduled).await?;
                }
            }
        }

        if let Some((task, cause)) = first_failure {
            info!(stage, task = %task, "stage halted");
            return Err(ReleasedagError::TaskFailed { task, cause });
        }

        info!(stage, "stage finished");
        Ok(report)
    }

    async fn spawn_ready(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        debug!(?names, "spawning ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }
}
