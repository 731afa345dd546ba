// src/engine/runner.rs

//! Entry point for executing requests against a [`TaskRegistry`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::{ExecutionPlan, ExecutionRequest, Group, Scheduler, TaskRegistry, resolve};
use crate::errors::Result;
use crate::exec::{ExecutorBackend, RealExecutorBackend, TaskContext};

use super::{RunOptions, RunReport, RuntimeEvent, Runtime};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Runs tasks and sequences of groups from a shared registry.
///
/// Each call to [`Runner::run`] or [`Runner::run_sequence`] is independent:
/// a task runs at most once per call, but a later call runs it again.
#[derive(Debug, Clone)]
pub struct Runner {
    registry: Arc<TaskRegistry>,
    options: RunOptions,
    ctx: TaskContext,
}

impl Runner {
    pub fn new(registry: Arc<TaskRegistry>, ctx: TaskContext) -> Self {
        Self {
            registry,
            options: RunOptions::default(),
            ctx,
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn registry(&self) -> &TaskRegistry {
        &self.registry
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn context(&self) -> &TaskContext {
        &self.ctx
    }

    /// Resolve `request` without running anything.
    pub fn plan(&self, request: &ExecutionRequest) -> Result<ExecutionPlan> {
        resolve(&self.registry, request)
    }

    /// Run `name` after its transitive prerequisites.
    ///
    /// `name` may also be a pipeline, which runs its steps in order.
    pub async fn run(&self, name: &str) -> Result<RunReport> {
        self.execute(&ExecutionRequest::task(name)).await
    }

    /// Run each group to completion before starting the next one.
    ///
    /// Members of a group (and their prerequisites) run concurrently. A task
    /// that already ran in an earlier group is not run again.
    pub async fn run_sequence<I, G>(&self, groups: I) -> Result<RunReport>
    where
        I: IntoIterator<Item = G>,
        G: Into<Group>,
    {
        self.execute(&ExecutionRequest::sequence(groups)).await
    }

    /// Execute `request` with the production executor.
    pub async fn execute(&self, request: &ExecutionRequest) -> Result<RunReport> {
        let ctx = self.ctx.clone();
        self.execute_with(request, move |tx| RealExecutorBackend::new(tx, ctx.clone()))
            .await
    }

    /// Execute `request`, building one executor backend per stage.
    ///
    /// The whole request is resolved before anything runs, so unknown tasks
    /// and cycles are reported with no side effects.
    pub async fn execute_with<F, E>(
        &self,
        request: &ExecutionRequest,
        mut make_backend: F,
    ) -> Result<RunReport>
    where
        F: FnMut(mpsc::Sender<RuntimeEvent>) -> E,
        E: ExecutorBackend,
    {
        let plan = self.plan(request)?;
        info!(
            stages = plan.stages().len(),
            tasks = plan.task_count(),
            strict = self.options.strict,
            jobs = ?self.options.jobs,
            "executing request"
        );

        let mut report = RunReport::default();

        for stage in plan.stages() {
            if stage.is_empty() {
                debug!(stage = stage.index(), requested = ?stage.requested(), "nothing left to run in stage");
                continue;
            }

            let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
            let scheduler = Scheduler::new(&self.registry, stage, &self.options);
            let runtime = Runtime::new(scheduler, rx, make_backend(tx));

            report.absorb(runtime.run().await?);
        }

        Ok(report)
    }
}

