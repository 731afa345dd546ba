// src/dag/mod.rs

//! Task graph representation, resolution and scheduling.
//!
//! - [`task`] defines a [`Task`]: a name, prerequisites and a unit of work.
//! - [`registry`] holds the validated, immutable [`TaskRegistry`].
//! - [`plan`] resolves an [`ExecutionRequest`] into ordered [`Stage`]s,
//!   detecting unknown names and cycles before anything runs.
//! - [`scheduler`] contains the per-stage state machine that decides
//!   which tasks are ready to run, and when the stage is done.
//! - [`task_info`] provides task metadata and scheduled task types.
//! - [`scheduler_step`] defines the result type for scheduler steps.
//! - [`state_manager`] manages per-stage state transitions.

pub mod plan;
pub mod registry;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task;
pub mod task_info;

pub use plan::{ExecutionPlan, ExecutionRequest, Group, Stage, resolve};
pub use registry::{Pipeline, RegistryBuilder, TaskRegistry};
pub use scheduler::Scheduler;
pub use scheduler_step::SchedulerStep;
pub use task::Task;
pub use task_info::{ScheduledTask, TaskRunState};
