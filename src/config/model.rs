// src/config/model.rs

use std::collections::BTreeMap;
use std::num::NonZeroUsize;

use serde::Deserialize;

/// Top-level configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// default = "build"
/// jobs = 4
///
/// [task.lint]
/// cmd = "jshint src"
/// lenient = true
///
/// [task.build]
/// after = ["lint"]
/// cmd = "rollup -c"
///
/// [pipeline.ci]
/// steps = [["clean", "lint"], "build"]
///
/// [[watch]]
/// paths = ["src/**/*.js"]
/// run = ["lint"]
/// ```
///
/// All sections are optional here; [`ConfigFile`]'s `TryFrom` impl decides
/// what a usable file must contain.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// All tasks from `[task.<name>]`, keyed by task name.
    #[serde(default)]
    pub task: BTreeMap<String, TaskConfig>,

    /// Named sequences of groups from `[pipeline.<name>]`.
    #[serde(default)]
    pub pipeline: BTreeMap<String, PipelineConfig>,

    /// File-change rules from `[[watch]]`, in file order.
    #[serde(default)]
    pub watch: Vec<WatchRule>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`), so
/// holders can rely on every reference in it resolving.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    config: ConfigSection,
    task: BTreeMap<String, TaskConfig>,
    pipeline: BTreeMap<String, PipelineConfig>,
    watch: Vec<WatchRule>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(raw: RawConfigFile) -> Self {
        Self {
            config: raw.config,
            task: raw.task,
            pipeline: raw.pipeline,
            watch: raw.watch,
        }
    }

    pub fn settings(&self) -> &ConfigSection {
        &self.config
    }

    pub fn tasks(&self) -> &BTreeMap<String, TaskConfig> {
        &self.task
    }

    pub fn pipelines(&self) -> &BTreeMap<String, PipelineConfig> {
        &self.pipeline
    }

    pub fn watch_rules(&self) -> &[WatchRule] {
        &self.watch
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigSection {
    /// Task or pipeline run when no name is given on the command line.
    #[serde(default)]
    pub default: Option<String>,

    /// Maximum number of units of work in flight. `0` means unlimited.
    #[serde(default)]
    pub jobs: usize,
}

impl ConfigSection {
    pub fn jobs_limit(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.jobs)
    }
}

/// `[task.<name>]` section.
///
/// At most one of `cmd`, `clean`, `bump` and `release` may be set. A task
/// with none of them only groups its prerequisites.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TaskConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Prerequisites: this task starts only after all of these succeeded.
    #[serde(default)]
    pub after: Vec<String>,

    /// Shell command to execute.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Paths (relative to the project root) to delete.
    #[serde(default)]
    pub clean: Option<Vec<String>>,

    /// JSON manifests whose `version` field is bumped according to `--type`.
    #[serde(default)]
    pub bump: Option<Vec<String>>,

    /// Commit and push a release.
    #[serde(default)]
    pub release: Option<ReleaseConfig>,

    /// Failure is only a warning when the run is not strict (watch mode).
    #[serde(default)]
    pub lenient: bool,

    /// The command keeps running after the task completes (e.g. a server).
    #[serde(default)]
    pub long_lived: bool,

    /// Regex a stdout line must match before a long-lived task counts as
    /// completed. Without it the task completes once the process spawned.
    #[serde(default)]
    pub ready_on_stdout: Option<String>,

    /// URL served by a long-lived task; opened in a browser with `--open`.
    #[serde(default)]
    pub open: Option<String>,
}

impl TaskConfig {
    /// Number of action fields set on this task.
    pub fn action_count(&self) -> usize {
        [
            self.cmd.is_some(),
            self.clean.is_some(),
            self.bump.is_some(),
            self.release.is_some(),
        ]
        .into_iter()
        .filter(|set| *set)
        .count()
    }
}

/// `release = { ... }` inline table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReleaseConfig {
    /// Manifest the release version is read from.
    #[serde(default = "default_manifest")]
    pub manifest: String,

    /// Paths passed to `git add` before committing.
    #[serde(default)]
    pub add: Vec<String>,

    #[serde(default = "default_remote")]
    pub remote: String,

    #[serde(default = "default_branch")]
    pub branch: String,
}

fn default_manifest() -> String {
    "package.json".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "master".to_string()
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            manifest: default_manifest(),
            add: Vec::new(),
            remote: default_remote(),
            branch: default_branch(),
        }
    }
}

/// `[pipeline.<name>]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub description: Option<String>,

    /// Groups run one after another; a bare string is a group of one.
    pub steps: Vec<StepConfig>,
}

/// One step of a pipeline: `"test"` or `["compress", "copy"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum StepConfig {
    One(String),
    Group(Vec<String>),
}

impl StepConfig {
    pub fn members(&self) -> Vec<String> {
        match self {
            StepConfig::One(name) => vec![name.clone()],
            StepConfig::Group(names) => names.clone(),
        }
    }
}

/// `[[watch]]` rule: when a file matching `paths` (and not `exclude`)
/// changes, run the tasks in `run` as one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WatchRule {
    pub paths: Vec<String>,

    #[serde(default)]
    pub exclude: Vec<String>,

    pub run: Vec<String>,
}
