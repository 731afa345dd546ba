// src/actions/clean.rs

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use tracing::{debug, info};

use crate::exec::{Action, ActionFuture, TaskContext};
use crate::fs::FileSystem;

/// Deletes files and directories below the project root.
#[derive(Debug, Clone)]
pub struct CleanAction {
    paths: Vec<String>,
    fs: Arc<dyn FileSystem>,
}

impl CleanAction {
    pub fn new(paths: Vec<String>, fs: Arc<dyn FileSystem>) -> Self {
        Self { paths, fs }
    }

    async fn run(&self, ctx: &TaskContext) -> Result<()> {
        for entry in &self.paths {
            if entry.split(['/', '\\']).all(|part| part.trim().is_empty() || part == ".")
                || Path::new(entry).is_absolute()
                || entry.split(['/', '\\']).any(|part| part == "..")
            {
                bail!("refusing to clean '{entry}': path must stay inside the project root");
            }

            let path = ctx.resolve(entry);
            if self.fs.remove_all(&path)? {
                info!(task = %ctx.task, path = %path.display(), "removed");
            } else {
                debug!(task = %ctx.task, path = %path.display(), "nothing to remove");
            }
        }
        Ok(())
    }
}

impl Action for CleanAction {
    fn execute<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(self.run(ctx))
    }
}
