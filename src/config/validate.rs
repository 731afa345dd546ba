// src/config/validate.rs

use globset::Glob;
use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use regex::Regex;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{ReleasedagError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ReleasedagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw))
    }
}

/// Run every check on a raw config without consuming it.
pub fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    ensure_has_tasks(cfg)?;
    validate_task_actions(cfg)?;
    validate_task_dependencies(cfg)?;
    validate_dag(cfg)?;
    validate_pipelines(cfg)?;
    validate_watch_rules(cfg)?;
    validate_default(cfg)?;
    Ok(())
}

fn config_error(msg: impl Into<String>) -> ReleasedagError {
    ReleasedagError::ConfigError(msg.into())
}

fn ensure_has_tasks(cfg: &RawConfigFile) -> Result<()> {
    if cfg.task.is_empty() {
        return Err(config_error(
            "config must contain at least one [task.<name>] section",
        ));
    }
    Ok(())
}

fn validate_task_actions(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in &cfg.task {
        if task.action_count() > 1 {
            return Err(config_error(format!(
                "task '{name}' sets more than one of `cmd`, `clean`, `bump`, `release`"
            )));
        }

        if task.long_lived && task.cmd.is_none() {
            return Err(config_error(format!(
                "task '{name}' is `long_lived` but has no `cmd`"
            )));
        }

        if let Some(pattern) = &task.ready_on_stdout {
            if !task.long_lived {
                return Err(config_error(format!(
                    "task '{name}' sets `ready_on_stdout` without `long_lived = true`"
                )));
            }
            Regex::new(pattern).map_err(|e| {
                config_error(format!(
                    "task '{name}' has invalid `ready_on_stdout` regex: {e}"
                ))
            })?;
        }

        if let Some(url) = &task.open {
            if !task.long_lived {
                return Err(config_error(format!(
                    "task '{name}' sets `open` without `long_lived = true`"
                )));
            }
            if url.trim().is_empty() {
                return Err(config_error(format!("task '{name}' has an empty `open` URL")));
            }
        }

        if task.release.as_ref().is_some_and(|release| release.add.is_empty()) {
            return Err(config_error(format!(
                "task '{name}' has a `release` with nothing to `add`"
            )));
        }
    }
    Ok(())
}

fn validate_task_dependencies(cfg: &RawConfigFile) -> Result<()> {
    for (name, task) in &cfg.task {
        for dep in &task.after {
            if dep == name {
                return Err(config_error(format!(
                    "task '{name}' cannot depend on itself in `after`"
                )));
            }
            if !cfg.task.contains_key(dep) {
                return Err(ReleasedagError::UnknownPrerequisite {
                    task: name.clone(),
                    prerequisite: dep.clone(),
                });
            }
        }
    }
    Ok(())
}

fn validate_dag(cfg: &RawConfigFile) -> Result<()> {
    // Edge direction: task -> prerequisite. For
    //   [task.B]
    //   after = ["A"]
    // we add edge B -> A.
    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();

    for name in cfg.task.keys() {
        graph.add_node(name.as_str());
    }

    for (name, task) in &cfg.task {
        for dep in &task.after {
            graph.add_edge(name.as_str(), dep.as_str(), ());
        }
    }

    match toposort(&graph, None) {
        Ok(_order) => Ok(()),
        Err(cycle) => {
            let start = cycle.node_id();
            let path = cycle_through(&graph, start).unwrap_or_else(|| vec![start, start]);
            Err(ReleasedagError::CyclicDependency(
                path.into_iter().map(str::to_string).collect(),
            ))
        }
    }
}

/// Find a path `start -> ... -> start` in `graph`, if any.
fn cycle_through<'a>(graph: &DiGraphMap<&'a str, ()>, start: &'a str) -> Option<Vec<&'a str>> {
    fn walk<'a>(
        graph: &DiGraphMap<&'a str, ()>,
        start: &'a str,
        node: &'a str,
        path: &mut Vec<&'a str>,
        seen: &mut Vec<&'a str>,
    ) -> bool {
        for next in graph.neighbors(node) {
            if next == start {
                path.push(next);
                return true;
            }
            if seen.contains(&next) {
                continue;
            }
            seen.push(next);
            path.push(next);
            if walk(graph, start, next, path, seen) {
                return true;
            }
            path.pop();
        }
        false
    }

    let mut path = vec![start];
    let mut seen = vec![start];
    walk(graph, start, start, &mut path, &mut seen).then_some(path)
}

fn validate_pipelines(cfg: &RawConfigFile) -> Result<()> {
    for (name, pipeline) in &cfg.pipeline {
        if cfg.task.contains_key(name) {
            return Err(ReleasedagError::DuplicateTask(name.clone()));
        }
        if pipeline.steps.is_empty() {
            return Err(config_error(format!("pipeline '{name}' has no steps")));
        }
        for step in &pipeline.steps {
            let members = step.members();
            if members.is_empty() {
                return Err(config_error(format!(
                    "pipeline '{name}' has an empty step"
                )));
            }
            for member in members {
                if !cfg.task.contains_key(&member) {
                    return Err(config_error(format!(
                        "pipeline '{name}' references unknown task '{member}'"
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_watch_rules(cfg: &RawConfigFile) -> Result<()> {
    for (idx, rule) in cfg.watch.iter().enumerate() {
        if rule.paths.is_empty() {
            return Err(config_error(format!("[[watch]] #{idx} has no `paths`")));
        }
        if rule.run.is_empty() {
            return Err(config_error(format!("[[watch]] #{idx} has nothing to `run`")));
        }
        for pattern in rule.paths.iter().chain(&rule.exclude) {
            Glob::new(pattern).map_err(|e| {
                config_error(format!("[[watch]] #{idx} has invalid glob '{pattern}': {e}"))
            })?;
        }
        for task in &rule.run {
            if !cfg.task.contains_key(task) {
                return Err(config_error(format!(
                    "[[watch]] #{idx} runs unknown task '{task}'"
                )));
            }
        }
    }
    Ok(())
}

fn validate_default(cfg: &RawConfigFile) -> Result<()> {
    if let Some(default) = &cfg.config.default {
        if !cfg.task.contains_key(default) && !cfg.pipeline.contains_key(default) {
            return Err(config_error(format!(
                "[config].default names unknown task or pipeline '{default}'"
            )));
        }
    }
    Ok(())
}
