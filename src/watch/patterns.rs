// src/watch/patterns.rs

use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::WatchRule;
use crate::types::TaskName;

/// Compiled `paths` / `exclude` glob patterns for a single `[[watch]]` rule.
///
/// The patterns are relative to the project root; the watcher passes
/// relative paths (e.g. `"src/logger.js"`) into [`WatchProfile::matches`].
#[derive(Clone)]
pub struct WatchProfile {
    index: usize,
    run: Vec<TaskName>,
    watch_set: GlobSet,
    exclude_set: Option<GlobSet>,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("index", &self.index)
            .field("run", &self.run)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    /// Position of the rule in the config file.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Tasks to run when a matching path changes.
    pub fn run(&self) -> &[TaskName] {
        &self.run
    }

    /// Whether a change to `rel_path` should trigger this rule.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.watch_set.is_match(rel_path) {
            return false;
        }
        if let Some(exclude) = &self.exclude_set {
            if exclude.is_match(rel_path) {
                return false;
            }
        }
        true
    }
}

/// Compile one profile per `[[watch]]` rule, keeping file order.
pub fn build_profiles(rules: &[WatchRule]) -> Result<Vec<WatchProfile>> {
    rules
        .iter()
        .enumerate()
        .map(|(index, rule)| {
            let watch_set = build_globset(&rule.paths)
                .with_context(|| format!("building paths globset for [[watch]] #{index}"))?;

            let exclude_set = if rule.exclude.is_empty() {
                None
            } else {
                Some(
                    build_globset(&rule.exclude).with_context(|| {
                        format!("building exclude globset for [[watch]] #{index}")
                    })?,
                )
            };

            Ok(WatchProfile {
                index,
                run: rule.run.clone(),
                watch_set,
                exclude_set,
            })
        })
        .collect()
}

/// Tasks triggered by a change to `rel_path`, in rule order, without
/// duplicates.
pub fn tasks_for_path(profiles: &[WatchProfile], rel_path: &str) -> Vec<TaskName> {
    let mut tasks: Vec<TaskName> = Vec::new();
    for profile in profiles.iter().filter(|p| p.matches(rel_path)) {
        for task in profile.run() {
            if !tasks.contains(task) {
                tasks.push(task.clone());
            }
        }
    }
    tasks
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
