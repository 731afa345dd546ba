// src/actions/release.rs

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::info;

use crate::actions::bump::read_version;
use crate::config::ReleaseConfig;
use crate::errors::ReleasedagError;
use crate::exec::{Action, ActionFuture, TaskContext};
use crate::fs::FileSystem;
use crate::vcs::Vcs;

/// Commits the release files and pushes them.
///
/// Sequence: validate the manifest version, require a dirty working tree,
/// `git add`, `git commit -m "chore(release): v<version>" --no-verify`,
/// `git push <remote> <branch>`. The first failing step fails the task.
#[derive(Debug, Clone)]
pub struct ReleaseAction {
    config: ReleaseConfig,
    fs: Arc<dyn FileSystem>,
    vcs: Arc<dyn Vcs>,
}

impl ReleaseAction {
    pub fn new(config: ReleaseConfig, fs: Arc<dyn FileSystem>, vcs: Arc<dyn Vcs>) -> Self {
        Self { config, fs, vcs }
    }

    async fn run(&self, ctx: &TaskContext) -> Result<()> {
        let manifest = &self.config.manifest;
        let path = ctx.resolve(manifest);
        let text = self.fs.read_to_string(&path)?;
        let doc: Value = serde_json::from_str(&text)
            .with_context(|| format!("parsing manifest {}", path.display()))?;
        let version = read_version(&doc, manifest).map_err(|e| {
            e.context(format!(
                "fix the version number in {manifest} and run the release again"
            ))
        })?;

        let status = self.vcs.status_porcelain(&ctx.root).await?;
        if status.trim().is_empty() {
            return Err(ReleasedagError::InvalidInput(
                "no changes detected in this repo; aborting release".to_string(),
            )
            .into());
        }

        let message = commit_message(&version.to_string());
        info!(task = %ctx.task, %version, "releasing");

        self.vcs.add(&ctx.root, &self.config.add).await?;
        self.vcs.commit(&ctx.root, &message).await?;
        self.vcs
            .push(&ctx.root, &self.config.remote, &self.config.branch)
            .await?;

        info!(
            task = %ctx.task,
            remote = %self.config.remote,
            branch = %self.config.branch,
            "release pushed"
        );
        Ok(())
    }
}

impl Action for ReleaseAction {
    fn execute<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(self.run(ctx))
    }
}

/// `chore(release): v<version>`
pub fn commit_message(version: &str) -> String {
    format!("chore(release): v{version}")
}
