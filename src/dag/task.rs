// src/dag/task.rs

use std::sync::Arc;

use crate::exec::{Action, NoopAction};
use crate::types::TaskName;

/// A named unit of work with declared prerequisites.
#[derive(Debug, Clone)]
pub struct Task {
    name: TaskName,
    description: Option<String>,
    prerequisites: Vec<TaskName>,
    action: Arc<dyn Action>,
    lenient: bool,
}

impl Task {
    pub fn new(name: impl Into<TaskName>, action: Arc<dyn Action>) -> Self {
        Self {
            name: name.into(),
            description: None,
            prerequisites: Vec::new(),
            action,
            lenient: false,
        }
    }

    /// A task with no work of its own; it only groups its prerequisites.
    pub fn aggregate(name: impl Into<TaskName>) -> Self {
        Self::new(name, Arc::new(NoopAction))
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a prerequisite. Repeated names are ignored.
    pub fn after(mut self, prerequisite: impl Into<TaskName>) -> Self {
        let prerequisite = prerequisite.into();
        if !self.prerequisites.contains(&prerequisite) {
            self.prerequisites.push(prerequisite);
        }
        self
    }

    pub fn after_all<I, S>(self, prerequisites: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        prerequisites.into_iter().fold(self, |task, p| task.after(p))
    }

    /// Mark the task's failures as downgradable when the runner is not strict.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn prerequisites(&self) -> &[TaskName] {
        &self.prerequisites
    }

    pub fn action(&self) -> &Arc<dyn Action> {
        &self.action
    }

    pub fn is_lenient(&self) -> bool {
        self.lenient
    }
}
