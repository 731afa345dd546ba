// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::TaskName;

#[derive(Error, Debug)]
pub enum ReleasedagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task '{0}' is already registered")]
    DuplicateTask(TaskName),

    #[error("Task not found: {0}")]
    UnknownTask(TaskName),

    #[error("Task '{task}' lists unknown prerequisite '{prerequisite}'")]
    UnknownPrerequisite {
        task: TaskName,
        prerequisite: TaskName,
    },

    #[error("Cyclic dependency: {}", .0.join(" -> "))]
    CyclicDependency(Vec<TaskName>),

    #[error("Task '{task}' failed: {cause:#}")]
    TaskFailed {
        task: TaskName,
        #[source]
        cause: anyhow::Error,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReleasedagError {
    /// Name of the task that failed, if this is a [`ReleasedagError::TaskFailed`].
    pub fn failed_task(&self) -> Option<&str> {
        match self {
            ReleasedagError::TaskFailed { task, .. } => Some(task),
            _ => None,
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReleasedagError>;
