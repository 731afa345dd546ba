// src/dag/task_info.rs

//! Task metadata and per-stage state.

use std::sync::Arc;

use crate::dag::task::Task;
use crate::exec::Action;
use crate::types::TaskName;

/// State of a task within the stage being executed.
///
/// Every task moves `Pending -> Running -> Succeeded | Failed`, or
/// `Pending -> Skipped` when the stage halts before it could start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting on prerequisites (or on a free job slot).
    Pending,
    /// Dispatched to the executor; its unit of work is in flight.
    Running,
    /// Unit of work finished successfully (or a lenient failure was
    /// downgraded).
    Succeeded,
    Failed,
    /// Never started because another task in the stage failed.
    Skipped,
}

impl TaskRunState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskRunState::Succeeded | TaskRunState::Failed | TaskRunState::Skipped
        )
    }
}

/// Static task information for one stage, plus its current state.
#[derive(Debug, Clone)]
pub struct TaskInfo {
    pub name: TaskName,
    pub action: Arc<dyn Action>,
    pub lenient: bool,
    /// Prerequisites that are part of this stage.
    pub deps: Vec<TaskName>,
    pub run_state: TaskRunState,
}

impl TaskInfo {
    pub fn from_task(task: &Task, deps: Vec<TaskName>) -> Self {
        Self {
            name: task.name().to_string(),
            action: Arc::clone(task.action()),
            lenient: task.is_lenient(),
            deps,
            run_state: TaskRunState::Pending,
        }
    }
}

/// Description of a task that the scheduler wants the executor to run now.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub action: Arc<dyn Action>,
    /// Index of the stage this dispatch belongs to.
    pub stage: usize,
}

impl ScheduledTask {
    pub fn from_task_info(info: &TaskInfo, stage: usize) -> Self {
        Self {
            name: info.name.clone(),
            action: Arc::clone(&info.action),
            stage,
        }
    }
}
