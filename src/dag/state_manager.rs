// src/dag/state_manager.rs

//! Per-stage state transitions for tasks in the scheduler.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::task_info::{ScheduledTask, TaskInfo, TaskRunState};
use crate::types::TaskName;

/// Manages state transitions for the tasks of one stage.
pub struct StateManager<'a> {
    tasks: &'a mut BTreeMap<TaskName, TaskInfo>,
    stage: usize,
}

impl<'a> StateManager<'a> {
    pub fn new(tasks: &'a mut BTreeMap<TaskName, TaskInfo>, stage: usize) -> Self {
        Self { tasks, stage }
    }

    /// Collect `Pending` tasks whose prerequisites all succeeded, mark them
    /// `Running` and return them as `ScheduledTask`s.
    ///
    /// `free_slots` caps how many tasks may start (`None` = unlimited).
    pub fn collect_new_ready_tasks(&mut self, free_slots: Option<usize>) -> Vec<ScheduledTask> {
        // Decide first, then mutate to avoid borrowing issues.
        let tasks: &BTreeMap<TaskName, TaskInfo> = self.tasks;
        let candidates: Vec<TaskName> = tasks
            .values()
            .filter(|info| info.run_state == TaskRunState::Pending && deps_satisfied(tasks, info))
            .map(|info| info.name.clone())
            .take(free_slots.unwrap_or(usize::MAX))
            .collect();

        let mut ready = Vec::with_capacity(candidates.len());
        for name in candidates {
            if let Some(info) = self.tasks.get_mut(&name) {
                info!(task = %info.name, stage = self.stage, "prerequisites done; starting task");
                info.run_state = TaskRunState::Running;
                ready.push(ScheduledTask::from_task_info(info, self.stage));
            }
        }

        ready
    }

    /// Mark every task that has not started yet as `Skipped`.
    ///
    /// Returns the names of the tasks that were skipped.
    pub fn skip_pending(&mut self) -> Vec<TaskName> {
        let mut skipped = Vec::new();
        for info in self.tasks.values_mut() {
            if info.run_state == TaskRunState::Pending {
                debug!(task = %info.name, stage = self.stage, "skipping task after failure in stage");
                info.run_state = TaskRunState::Skipped;
                skipped.push(info.name.clone());
            }
        }
        skipped
    }
}

/// Whether every prerequisite of `info` has succeeded in this stage.
///
/// Prerequisites that ran in earlier stages are not listed in `info.deps`,
/// so they never block.
pub fn deps_satisfied(tasks: &BTreeMap<TaskName, TaskInfo>, info: &TaskInfo) -> bool {
    info.deps.iter().all(|dep_name| match tasks.get(dep_name) {
        Some(dep) => dep.run_state == TaskRunState::Succeeded,
        None => {
            warn!(
                task = %info.name,
                dep = %dep_name,
                "prerequisite missing from stage"
            );
            false
        }
    })
}
