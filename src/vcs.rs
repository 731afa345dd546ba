// src/vcs.rs

//! Source-control access used by the release action.
//!
//! The release action only talks to the [`Vcs`] trait; [`GitCli`] shells out
//! to the `git` binary in production and tests substitute a fake.

use std::fmt::Debug;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::process::Stdio;

use anyhow::{Context, Result, bail};
use tokio::process::Command;
use tracing::debug;

pub type VcsFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Operations the release sequence needs from source control.
pub trait Vcs: Send + Sync + Debug {
    /// Output of `git status --porcelain`: empty when the tree is clean.
    fn status_porcelain<'a>(&'a self, root: &'a Path) -> VcsFuture<'a, String>;

    fn add<'a>(&'a self, root: &'a Path, paths: &'a [String]) -> VcsFuture<'a, ()>;

    fn commit<'a>(&'a self, root: &'a Path, message: &'a str) -> VcsFuture<'a, ()>;

    fn push<'a>(&'a self, root: &'a Path, remote: &'a str, branch: &'a str) -> VcsFuture<'a, ()>;
}

/// [`Vcs`] backed by the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: PathBuf,
}

impl Default for GitCli {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different `git` executable.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn git(&self, root: &Path, args: &[&str]) -> Result<String> {
        debug!(?args, root = %root.display(), "running git");

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(root)
            .stdin(Stdio::null())
            .output()
            .await
            .with_context(|| format!("failed to run {} {}", self.program.display(), args.join(" ")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "git {} exited with {}: {}",
                args.join(" "),
                output.status,
                stderr.trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Vcs for GitCli {
    fn status_porcelain<'a>(&'a self, root: &'a Path) -> VcsFuture<'a, String> {
        Box::pin(self.git(root, &["status", "--porcelain"]))
    }

    fn add<'a>(&'a self, root: &'a Path, paths: &'a [String]) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            let mut args = vec!["add", "--"];
            args.extend(paths.iter().map(String::as_str));
            self.git(root, &args).await.map(drop)
        })
    }

    fn commit<'a>(&'a self, root: &'a Path, message: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            self.git(root, &["commit", "-m", message, "--no-verify"])
                .await
                .map(drop)
        })
    }

    fn push<'a>(&'a self, root: &'a Path, remote: &'a str, branch: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(async move { self.git(root, &["push", remote, branch]).await.map(drop) })
    }
}
