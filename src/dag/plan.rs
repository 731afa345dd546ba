// src/dag/plan.rs

//! Turning an execution request into an ordered list of stages.
//!
//! Resolution happens entirely before any unit of work starts, so unknown
//! names and dependency cycles are reported without side effects.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;

use crate::dag::registry::TaskRegistry;
use crate::errors::{ReleasedagError, Result};
use crate::types::TaskName;

/// A set of tasks that may run concurrently, followed by a barrier.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Group(Vec<TaskName>);

impl Group {
    pub fn new<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        Self(members.into_iter().map(Into::into).collect())
    }

    pub fn members(&self) -> &[TaskName] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for Group {
    fn from(name: &str) -> Self {
        Self(vec![name.to_string()])
    }
}

impl From<String> for Group {
    fn from(name: String) -> Self {
        Self(vec![name])
    }
}

impl From<Vec<&str>> for Group {
    fn from(names: Vec<&str>) -> Self {
        Self::new(names)
    }
}

impl From<Vec<String>> for Group {
    fn from(names: Vec<String>) -> Self {
        Self(names)
    }
}

impl<const N: usize> From<[&str; N]> for Group {
    fn from(names: [&str; N]) -> Self {
        Self::new(names)
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionRequest {
    /// A single task, or the name of a pipeline.
    Task(TaskName),
    /// Groups run strictly one after another.
    Sequence(Vec<Group>),
}

impl ExecutionRequest {
    pub fn task(name: impl Into<TaskName>) -> Self {
        ExecutionRequest::Task(name.into())
    }

    pub fn sequence<I, G>(groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<Group>,
    {
        ExecutionRequest::Sequence(groups.into_iter().map(Into::into).collect())
    }
}

/// The subgraph executed for one group of a request.
///
/// `tasks` maps every task in the stage to its prerequisites *within the
/// stage*; prerequisites that already ran in an earlier stage are dropped.
#[derive(Debug, Clone)]
pub struct Stage {
    index: usize,
    requested: Vec<TaskName>,
    tasks: BTreeMap<TaskName, Vec<TaskName>>,
}

impl Stage {
    pub fn index(&self) -> usize {
        self.index
    }

    /// The group members that caused this stage.
    pub fn requested(&self) -> &[TaskName] {
        &self.requested
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.keys().map(String::as_str)
    }

    pub fn prerequisites_of(&self, task: &str) -> &[TaskName] {
        self.tasks.get(task).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, task: &str) -> bool {
        self.tasks.contains_key(task)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Group the stage's tasks by dependency depth: level 0 holds tasks with
    /// no prerequisites in this stage, level N tasks whose deepest
    /// prerequisite sits on level N-1. Tasks on one level are independent.
    pub fn levels(&self) -> Vec<Vec<TaskName>> {
        // Edge direction: prerequisite -> dependent.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for (name, deps) in &self.tasks {
            graph.add_node(name.as_str());
            for dep in deps {
                graph.add_edge(dep.as_str(), name.as_str(), ());
            }
        }

        // Stages come out of `resolve`, which rejects cycles.
        let order = toposort(&graph, None).unwrap_or_default();

        let mut depth: HashMap<&str, usize> = HashMap::new();
        for name in order {
            let d = self
                .prerequisites_of(name)
                .iter()
                .filter_map(|dep| depth.get(dep.as_str()))
                .map(|d| d + 1)
                .max()
                .unwrap_or(0);
            depth.insert(name, d);
        }

        let mut levels: Vec<Vec<TaskName>> = Vec::new();
        for (name, d) in depth {
            if levels.len() <= d {
                levels.resize_with(d + 1, Vec::new);
            }
            levels[d].push(name.to_string());
        }
        for level in &mut levels {
            level.sort();
        }
        levels
    }
}

/// A fully resolved request.
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    stages: Vec<Stage>,
}

impl ExecutionPlan {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Number of distinct tasks across all stages.
    pub fn task_count(&self) -> usize {
        self.stages.iter().map(Stage::len).sum()
    }
}

/// Resolve `request` against `registry`.
///
/// - A task name yields a single stage containing the task and its
///   transitive prerequisites.
/// - A pipeline name, or an explicit sequence, yields one stage per group.
///   Tasks that already belong to an earlier stage are not repeated.
///
/// Fails with [`ReleasedagError::UnknownTask`] for unregistered names and
/// [`ReleasedagError::CyclicDependency`] (carrying the offending path) when a
/// prerequisite chain revisits a task already on the current path.
pub fn resolve(registry: &TaskRegistry, request: &ExecutionRequest) -> Result<ExecutionPlan> {
    let groups: Vec<Group> = match request {
        ExecutionRequest::Task(name) => match registry.pipeline(name) {
            Some(pipeline) => pipeline.steps().to_vec(),
            None => vec![Group::from(name.as_str())],
        },
        ExecutionRequest::Sequence(groups) => groups.clone(),
    };

    let mut done: HashSet<TaskName> = HashSet::new();
    let mut stages = Vec::with_capacity(groups.len());

    for (index, group) in groups.iter().enumerate() {
        let mut tasks: BTreeMap<TaskName, Vec<TaskName>> = BTreeMap::new();

        for member in group.members() {
            if registry.get(member).is_none() {
                return Err(ReleasedagError::UnknownTask(member.clone()));
            }
            let mut path = Vec::new();
            visit(registry, member, &done, &mut tasks, &mut path)?;
        }

        done.extend(tasks.keys().cloned());
        stages.push(Stage {
            index,
            requested: group.members().to_vec(),
            tasks,
        });
    }

    Ok(ExecutionPlan { stages })
}

/// Depth-first walk over prerequisites, inserting tasks post-order.
fn visit(
    registry: &TaskRegistry,
    name: &str,
    done: &HashSet<TaskName>,
    stage: &mut BTreeMap<TaskName, Vec<TaskName>>,
    path: &mut Vec<TaskName>,
) -> Result<()> {
    if let Some(pos) = path.iter().position(|p| p == name) {
        let mut cycle = path[pos..].to_vec();
        cycle.push(name.to_string());
        return Err(ReleasedagError::CyclicDependency(cycle));
    }

    if done.contains(name) || stage.contains_key(name) {
        return Ok(());
    }

    let task = registry
        .get(name)
        .ok_or_else(|| ReleasedagError::UnknownTask(name.to_string()))?;

    path.push(name.to_string());
    for prerequisite in task.prerequisites() {
        visit(registry, prerequisite, done, stage, path)?;
    }
    path.pop();

    let deps = task
        .prerequisites()
        .iter()
        .filter(|p| !done.contains(*p))
        .cloned()
        .collect();
    stage.insert(name.to_string(), deps);
    Ok(())
}
