use std::path::Path;
use std::sync::{Arc, Mutex};

use releasedag::vcs::{Vcs, VcsFuture};

/// A call made against [`FakeVcs`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Status,
    Add(Vec<String>),
    Commit(String),
    Push { remote: String, branch: String },
}

/// In-memory [`Vcs`] that records calls and returns a canned status.
#[derive(Debug, Clone, Default)]
pub struct FakeVcs {
    status: String,
    fail_on: Option<&'static str>,
    calls: Arc<Mutex<Vec<VcsCall>>>,
}

impl FakeVcs {
    /// A working tree with uncommitted changes.
    pub fn dirty() -> Self {
        Self {
            status: " M package.json\n?? CHANGELOG.md\n".to_string(),
            ..Self::default()
        }
    }

    /// A working tree without changes.
    pub fn clean() -> Self {
        Self::default()
    }

    /// Make the named operation (`"add"`, `"commit"` or `"push"`) fail.
    pub fn failing_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: &'static str, call: VcsCall) -> anyhow::Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail_on == Some(op) {
            anyhow::bail!("fake git {op} failed");
        }
        Ok(())
    }
}

impl Vcs for FakeVcs {
    fn status_porcelain<'a>(&'a self, _root: &'a Path) -> VcsFuture<'a, String> {
        Box::pin(async move {
            self.record("status", VcsCall::Status)?;
            Ok(self.status.clone())
        })
    }

    fn add<'a>(&'a self, _root: &'a Path, paths: &'a [String]) -> VcsFuture<'a, ()> {
        Box::pin(async move { self.record("add", VcsCall::Add(paths.to_vec())) })
    }

    fn commit<'a>(&'a self, _root: &'a Path, message: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(async move { self.record("commit", VcsCall::Commit(message.to_string())) })
    }

    fn push<'a>(&'a self, _root: &'a Path, remote: &'a str, branch: &'a str) -> VcsFuture<'a, ()> {
        Box::pin(async move {
            self.record(
                "push",
                VcsCall::Push {
                    remote: remote.to_string(),
                    branch: branch.to_string(),
                },
            )
        })
    }
}
