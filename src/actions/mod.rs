// src/actions/mod.rs

//! Built-in units of work and the bridge from config to a [`TaskRegistry`].
//!
//! - [`clean`] removes build output.
//! - [`bump`] rewrites manifest versions according to `--type`.
//! - [`release`] commits and pushes a release through [`Vcs`].
//! - [`version`] parses and increments semantic versions.
//!
//! Shell-command tasks use [`crate::exec::ShellAction`].

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use tracing::debug;

use crate::config::{ConfigFile, TaskConfig};
use crate::dag::{Group, Pipeline, TaskRegistry, Task};
use crate::errors::{ReleasedagError, Result};
use crate::exec::{Action, NoopAction, ShellAction};
use crate::fs::{FileSystem, RealFileSystem};
use crate::vcs::{GitCli, Vcs};

pub mod bump;
pub mod clean;
pub mod release;
pub mod version;

pub use bump::BumpAction;
pub use clean::CleanAction;
pub use release::ReleaseAction;
pub use version::Version;

/// Side-effecting collaborators shared by the built-in actions.
#[derive(Clone)]
pub struct Services {
    pub fs: Arc<dyn FileSystem>,
    pub vcs: Arc<dyn Vcs>,
}

impl Services {
    pub fn new(fs: Arc<dyn FileSystem>, vcs: Arc<dyn Vcs>) -> Self {
        Self { fs, vcs }
    }
}

impl Default for Services {
    fn default() -> Self {
        Self {
            fs: Arc::new(RealFileSystem),
            vcs: Arc::new(GitCli::new()),
        }
    }
}

impl fmt::Debug for Services {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Services")
            .field("fs", &self.fs)
            .field("vcs", &self.vcs)
            .finish()
    }
}

/// Build the unit of work for one `[task.<name>]` section.
pub fn action_for(name: &str, cfg: &TaskConfig, services: &Services) -> Result<Arc<dyn Action>> {
    if let Some(cmd) = &cfg.cmd {
        let mut action = ShellAction::new(cmd.clone());
        if cfg.long_lived {
            let ready = cfg
                .ready_on_stdout
                .as_deref()
                .map(Regex::new)
                .transpose()
                .map_err(|e| {
                    ReleasedagError::ConfigError(format!(
                        "task '{name}' has invalid `ready_on_stdout` regex: {e}"
                    ))
                })?;
            action = action.long_lived(ready);
            if let Some(url) = &cfg.open {
                action = action.open_url(url.clone());
            }
        }
        return Ok(Arc::new(action));
    }

    if let Some(paths) = &cfg.clean {
        return Ok(Arc::new(CleanAction::new(paths.clone(), Arc::clone(&services.fs))));
    }

    if let Some(manifests) = &cfg.bump {
        return Ok(Arc::new(BumpAction::new(
            manifests.clone(),
            Arc::clone(&services.fs),
        )));
    }

    if let Some(release) = &cfg.release {
        return Ok(Arc::new(ReleaseAction::new(
            release.clone(),
            Arc::clone(&services.fs),
            Arc::clone(&services.vcs),
        )));
    }

    debug!(task = %name, "no action configured; aggregate task");
    Ok(Arc::new(NoopAction))
}

/// Register every task and pipeline of a validated config.
pub fn registry_from_config(cfg: &ConfigFile, services: &Services) -> Result<TaskRegistry> {
    let mut builder = TaskRegistry::builder();

    for (name, task_cfg) in cfg.tasks() {
        let mut task = Task::new(name.clone(), action_for(name, task_cfg, services)?)
            .after_all(task_cfg.after.iter().cloned())
            .lenient(task_cfg.lenient);
        if let Some(description) = &task_cfg.description {
            task = task.with_description(description.clone());
        }
        builder.register(task)?;
    }

    for (name, pipeline_cfg) in cfg.pipelines() {
        let steps = pipeline_cfg
            .steps
            .iter()
            .map(|step| Group::new(step.members()));
        let mut pipeline = Pipeline::new(name.clone(), steps);
        if let Some(description) = &pipeline_cfg.description {
            pipeline = pipeline.with_description(description.clone());
        }
        builder.register_pipeline(pipeline)?;
    }

    builder.build()
}
