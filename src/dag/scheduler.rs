use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use tracing::{debug, info, warn};

use crate::dag::plan::Stage;
use crate::dag::registry::TaskRegistry;
use crate::dag::scheduler_step::SchedulerStep;
use crate::dag::state_manager::{StateManager, deps_satisfied};
use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::engine::{RunOptions, TaskOutcome};
use crate::types::TaskName;

/// Scheduler holds one stage of an execution plan plus its mutable state.
///
/// It is responsible for:
/// - deciding when a task is "ready" to run (prerequisites succeeded)
/// - honouring the `jobs` limit on concurrently running tasks
/// - marking tasks as succeeded/failed
/// - halting the stage on the first failure: tasks already running may
///   finish, nothing new is started
/// - downgrading failures of lenient tasks when not strict
///
/// It performs no IO; the async shell in `engine::runtime` feeds it
/// completions and dispatches what it returns.
#[derive(Debug)]
pub struct Scheduler {
    stage: usize,
    tasks: BTreeMap<TaskName, TaskInfo>,
    jobs: Option<NonZeroUsize>,
    strict: bool,
    halted: bool,
    failed: Vec<TaskName>,
    downgraded: Vec<TaskName>,
}

impl Scheduler {
    /// Construct a scheduler for `stage`, looking tasks up in `registry`.
    pub fn new(registry: &TaskRegistry, stage: &Stage, options: &RunOptions) -> Self {
        let mut tasks = BTreeMap::new();

        for name in stage.task_names() {
            match registry.get(name) {
                Some(task) => {
                    let deps = stage.prerequisites_of(name).to_vec();
                    tasks.insert(name.to_string(), TaskInfo::from_task(task, deps));
                }
                None => warn!(task = %name, "stage task missing from registry; ignoring"),
            }
        }

        Self {
            stage: stage.index(),
            tasks,
            jobs: options.jobs,
            strict: options.strict,
            halted: false,
            failed: Vec::new(),
            downgraded: Vec::new(),
        }
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    /// True once nothing is running and nothing more will start.
    pub fn is_finished(&self) -> bool {
        let counts = self.read_only_counts();
        counts.running == 0 && (self.halted || counts.pending == 0)
    }

    /// Whether a task failed (and was not downgraded) in this stage.
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Read-only view of the given task's state.
    pub fn state_of(&self, task: &str) -> Option<TaskRunState> {
        self.tasks.get(task).map(|info| info.run_state)
    }

    /// Whether the prerequisites of `task` have all succeeded.
    ///
    /// Returns `None` if the task is not part of this stage.
    pub fn deps_satisfied(&self, task: &str) -> Option<bool> {
        let info = self.tasks.get(task)?;
        Some(deps_satisfied(&self.tasks, info))
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    /// Tasks that failed in this stage, in the order the failures arrived.
    pub fn failed(&self) -> &[TaskName] {
        &self.failed
    }

    /// Lenient tasks whose failure was treated as success.
    pub fn downgraded(&self) -> &[TaskName] {
        &self.downgraded
    }

    /// Begin the stage: dispatch every task whose prerequisites are already
    /// satisfied (the leaves), up to the `jobs` limit.
    pub fn start(&mut self) -> Vec<ScheduledTask> {
        debug!(stage = self.stage, tasks = self.tasks.len(), "scheduler: starting stage");
        let free = self.free_slots();
        let mut manager = StateManager::new(&mut self.tasks, self.stage);
        manager.collect_new_ready_tasks(free)
    }

    /// Handle completion of a task's unit of work (production API).
    pub fn handle_completion(&mut self, task: &str, outcome: TaskOutcome) -> Vec<ScheduledTask> {
        self.step_completion(task, outcome).newly_scheduled
    }

    /// Manual-step variant of `handle_completion` that returns a rich [`SchedulerStep`].
    pub fn step_completion(&mut self, task: &str, outcome: TaskOutcome) -> SchedulerStep {
        let mut step = SchedulerStep::default();
        let was_finished = self.is_finished();

        let Some(info) = self.tasks.get_mut(task) else {
            warn!(task = %task, "completion for task outside this stage; ignoring");
            return step;
        };

        if info.run_state != TaskRunState::Running {
            warn!(
                task = %task,
                state = ?info.run_state,
                "completion for task that is not running; ignoring"
            );
            return step;
        }

        match outcome {
            TaskOutcome::Success => {
                info.run_state = TaskRunState::Succeeded;
                debug!(task = %info.name, stage = self.stage, "task completed successfully");
            }
            TaskOutcome::Failed if info.lenient && !self.strict => {
                info.run_state = TaskRunState::Succeeded;
                warn!(
                    task = %info.name,
                    stage = self.stage,
                    "lenient task failed; continuing because the run is not strict"
                );
                self.downgraded.push(info.name.clone());
            }
            TaskOutcome::Failed => {
                info.run_state = TaskRunState::Failed;
                warn!(
                    task = %info.name,
                    stage = self.stage,
                    "task failed; no further tasks will start in this run"
                );
                step.newly_failed.push(info.name.clone());
                self.failed.push(info.name.clone());
                self.halted = true;
            }
        }

        if self.halted {
            let mut manager = StateManager::new(&mut self.tasks, self.stage);
            step.newly_skipped = manager.skip_pending();
        } else {
            let free = self.free_slots();
            let mut manager = StateManager::new(&mut self.tasks, self.stage);
            step.newly_scheduled = manager.collect_new_ready_tasks(free);
        }

        if !was_finished && self.is_finished() {
            info!(
                stage = self.stage,
                halted = self.halted,
                "scheduler: all tasks terminal; stage finished"
            );
            step.stage_just_finished = true;
        }

        step
    }

    fn free_slots(&self) -> Option<usize> {
        self.jobs
            .map(|jobs| jobs.get().saturating_sub(self.read_only_counts().running))
    }

    fn read_only_counts(&self) -> StateCounts {
        let mut counts = StateCounts::default();
        for info in self.tasks.values() {
            match info.run_state {
                TaskRunState::Pending => counts.pending += 1,
                TaskRunState::Running => counts.running += 1,
                _ => {}
            }
        }
        counts
    }
}

#[derive(Debug, Default)]
struct StateCounts {
    pending: usize,
    running: usize,
}
