#![allow(dead_code)]

use releasedag::config::{
    ConfigFile, PipelineConfig, RawConfigFile, ReleaseConfig, StepConfig, TaskConfig, WatchRule,
};
use releasedag::errors::Result;

/// Builder for `ConfigFile` to simplify test setup.
#[derive(Default)]
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_task(mut self, name: &str, task: TaskConfig) -> Self {
        self.config.task.insert(name.to_string(), task);
        self
    }

    /// Add a pipeline; each inner slice is one group.
    pub fn with_pipeline(mut self, name: &str, steps: &[&[&str]]) -> Self {
        let steps = steps
            .iter()
            .map(|group| match group {
                [single] => StepConfig::One(single.to_string()),
                many => StepConfig::Group(many.iter().map(|s| s.to_string()).collect()),
            })
            .collect();
        self.config.pipeline.insert(
            name.to_string(),
            PipelineConfig {
                description: None,
                steps,
            },
        );
        self
    }

    pub fn with_watch(mut self, paths: &[&str], exclude: &[&str], run: &[&str]) -> Self {
        self.config.watch.push(WatchRule {
            paths: paths.iter().map(|s| s.to_string()).collect(),
            exclude: exclude.iter().map(|s| s.to_string()).collect(),
            run: run.iter().map(|s| s.to_string()).collect(),
        });
        self
    }

    pub fn with_default(mut self, target: &str) -> Self {
        self.config.config.default = Some(target.to_string());
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.config.config.jobs = jobs;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<ConfigFile> {
        ConfigFile::try_from(self.config)
    }

    pub fn build(self) -> ConfigFile {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

/// Builder for `TaskConfig`.
#[derive(Default)]
pub struct TaskConfigBuilder {
    task: TaskConfig,
}

impl TaskConfigBuilder {
    /// A task running a shell command.
    pub fn new(cmd: &str) -> Self {
        Self {
            task: TaskConfig {
                cmd: Some(cmd.to_string()),
                ..TaskConfig::default()
            },
        }
    }

    /// A task without an action that only groups its prerequisites.
    pub fn aggregate() -> Self {
        Self::default()
    }

    pub fn clean(paths: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                clean: Some(paths.iter().map(|s| s.to_string()).collect()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn bump(manifests: &[&str]) -> Self {
        Self {
            task: TaskConfig {
                bump: Some(manifests.iter().map(|s| s.to_string()).collect()),
                ..TaskConfig::default()
            },
        }
    }

    pub fn release(release: ReleaseConfig) -> Self {
        Self {
            task: TaskConfig {
                release: Some(release),
                ..TaskConfig::default()
            },
        }
    }

    pub fn after(mut self, dep: &str) -> Self {
        self.task.after.push(dep.to_string());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.task.description = Some(text.to_string());
        self
    }

    pub fn lenient(mut self, val: bool) -> Self {
        self.task.lenient = val;
        self
    }

    pub fn long_lived(mut self, val: bool) -> Self {
        self.task.long_lived = val;
        self
    }

    pub fn ready_on_stdout(mut self, pattern: &str) -> Self {
        self.task.ready_on_stdout = Some(pattern.to_string());
        self
    }

    pub fn open(mut self, url: &str) -> Self {
        self.task.open = Some(url.to_string());
        self
    }

    pub fn build(self) -> TaskConfig {
        self.task
    }
}
