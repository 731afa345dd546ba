// src/dag/registry.rs

//! The task registry: every task and pipeline known to an invocation.
//!
//! Registration happens once, up front, through [`RegistryBuilder`]. Duplicate
//! names are rejected as they are registered; references to tasks that never
//! got registered are rejected by [`RegistryBuilder::build`]. The resulting
//! [`TaskRegistry`] is immutable.

use std::collections::BTreeMap;

use tracing::debug;

use crate::dag::plan::Group;
use crate::dag::task::Task;
use crate::errors::{ReleasedagError, Result};
use crate::types::TaskName;

/// A named, ordered list of groups run one after another.
#[derive(Debug, Clone)]
pub struct Pipeline {
    name: String,
    description: Option<String>,
    steps: Vec<Group>,
}

impl Pipeline {
    pub fn new<I, G>(name: impl Into<String>, steps: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Group>,
    {
        Self {
            name: name.into(),
            description: None,
            steps: steps.into_iter().map(Into::into).collect(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn steps(&self) -> &[Group] {
        &self.steps
    }
}

/// Collects tasks and pipelines before any execution begins.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tasks: BTreeMap<TaskName, Task>,
    pipelines: BTreeMap<String, Pipeline>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a task. The first registration of a name wins; a second one is
    /// rejected with [`ReleasedagError::DuplicateTask`].
    pub fn register(&mut self, task: Task) -> Result<()> {
        if self.is_taken(task.name()) {
            return Err(ReleasedagError::DuplicateTask(task.name().to_string()));
        }
        debug!(task = %task.name(), prerequisites = ?task.prerequisites(), "registered task");
        self.tasks.insert(task.name().to_string(), task);
        Ok(())
    }

    /// Add a pipeline. Pipelines share the task namespace.
    pub fn register_pipeline(&mut self, pipeline: Pipeline) -> Result<()> {
        if self.is_taken(pipeline.name()) {
            return Err(ReleasedagError::DuplicateTask(pipeline.name().to_string()));
        }
        debug!(pipeline = %pipeline.name(), steps = pipeline.steps().len(), "registered pipeline");
        self.pipelines.insert(pipeline.name().to_string(), pipeline);
        Ok(())
    }

    fn is_taken(&self, name: &str) -> bool {
        self.tasks.contains_key(name) || self.pipelines.contains_key(name)
    }

    /// Check every prerequisite and pipeline step against the registered
    /// tasks and freeze the registry.
    pub fn build(self) -> Result<TaskRegistry> {
        for task in self.tasks.values() {
            for prerequisite in task.prerequisites() {
                if !self.tasks.contains_key(prerequisite) {
                    return Err(ReleasedagError::UnknownPrerequisite {
                        task: task.name().to_string(),
                        prerequisite: prerequisite.clone(),
                    });
                }
            }
        }

        for pipeline in self.pipelines.values() {
            for member in pipeline.steps().iter().flat_map(Group::members) {
                if !self.tasks.contains_key(member) {
                    return Err(ReleasedagError::UnknownPrerequisite {
                        task: pipeline.name().to_string(),
                        prerequisite: member.clone(),
                    });
                }
            }
        }

        Ok(TaskRegistry {
            tasks: self.tasks,
            pipelines: self.pipelines,
        })
    }
}

/// Immutable mapping from name to task (and pipeline).
#[derive(Debug, Clone, Default)]
pub struct TaskRegistry {
    tasks: BTreeMap<TaskName, Task>,
    pipelines: BTreeMap<String, Pipeline>,
}

impl TaskRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn pipeline(&self, name: &str) -> Option<&Pipeline> {
        self.pipelines.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.contains_key(name) || self.pipelines.contains_key(name)
    }

    /// Tasks in name order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// Pipelines in name order.
    pub fn pipelines(&self) -> impl Iterator<Item = &Pipeline> {
        self.pipelines.values()
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}
