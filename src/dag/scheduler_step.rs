// src/dag/scheduler_step.rs

//! Step-by-step execution result types for the scheduler.

use crate::dag::task_info::ScheduledTask;
use crate::types::TaskName;

/// Structured result of a single scheduler "step".
///
/// This is useful for tests that want to manually step the DAG and make
/// assertions about what changed.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStep {
    /// Tasks that became ready to run as a result of this step.
    pub newly_scheduled: Vec<ScheduledTask>,
    /// Tasks newly marked as failed in this step. A lenient failure that was
    /// downgraded does not appear here.
    pub newly_failed: Vec<TaskName>,
    /// Tasks that will never start because the stage halted in this step.
    pub newly_skipped: Vec<TaskName>,
    /// Whether this step caused the stage to finish.
    pub stage_just_finished: bool,
}
