// src/exec/shell.rs

//! Shell-command units of work.

use std::process::Stdio;

use anyhow::{Context, Result, bail};
use regex::Regex;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::exec::action::{Action, ActionFuture};
use crate::exec::context::TaskContext;

/// Environment variable carrying the name of the running task.
pub const ENV_TASK: &str = "RELEASEDAG_TASK";
/// Environment variable carrying the `--type` flag, when given.
pub const ENV_BUMP: &str = "RELEASEDAG_BUMP";
/// Environment variable set to `1` when `--open` was given, `0` otherwise.
pub const ENV_OPEN: &str = "RELEASEDAG_OPEN";

/// Runs `cmd` through the platform shell in the project root.
///
/// Ordinary commands complete when the process exits; a non-zero exit is a
/// failure. Long-lived commands (a demo server, a live-reload endpoint)
/// complete as soon as they are up, either immediately after spawning or once
/// a stdout line matches `ready_on_stdout`. The process then stays alive in
/// the context's [`ProcessKeeper`](crate::exec::ProcessKeeper), and its URL,
/// if any, is opened when the run was started with `--open`.
#[derive(Debug, Clone)]
pub struct ShellAction {
    cmd: String,
    long_lived: bool,
    ready_on_stdout: Option<Regex>,
    open_url: Option<String>,
}

impl ShellAction {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            long_lived: false,
            ready_on_stdout: None,
            open_url: None,
        }
    }

    pub fn long_lived(mut self, ready_on_stdout: Option<Regex>) -> Self {
        self.long_lived = true;
        self.ready_on_stdout = ready_on_stdout;
        self
    }

    /// URL offered once the long-lived process is ready; opened with `--open`.
    pub fn open_url(mut self, url: impl Into<String>) -> Self {
        self.open_url = Some(url.into());
        self
    }

    fn build_command(&self, ctx: &TaskContext) -> Command {
        let mut cmd = if cfg!(windows) {
            let mut c = Command::new("cmd");
            c.arg("/C").arg(&self.cmd);
            c
        } else {
            let mut c = Command::new("sh");
            c.arg("-c").arg(&self.cmd);
            c
        };

        cmd.current_dir(&ctx.root)
            .env(ENV_TASK, &ctx.task)
            .env(ENV_OPEN, if ctx.open { "1" } else { "0" })
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(bump) = ctx.bump {
            cmd.env(ENV_BUMP, bump.as_str());
        }

        cmd
    }

    async fn run_to_exit(&self, ctx: &TaskContext) -> Result<()> {
        info!(task = %ctx.task, cmd = %self.cmd, "starting task process");

        let mut child = self
            .build_command(ctx)
            .spawn()
            .with_context(|| format!("spawning `{}`", self.cmd))?;

        let stdout = child
            .stdout
            .take()
            .map(|s| tokio::spawn(forward_lines(ctx.task.clone(), "stdout", BufReader::new(s).lines())));
        let stderr = child
            .stderr
            .take()
            .map(|s| tokio::spawn(forward_lines(ctx.task.clone(), "stderr", BufReader::new(s).lines())));

        let status = child
            .wait()
            .await
            .with_context(|| format!("waiting for `{}`", self.cmd))?;

        // Drain the pipes so the last lines of output are logged before the
        // completion is reported.
        for handle in [stdout, stderr].into_iter().flatten() {
            let _ = handle.await;
        }

        let code = status.code().unwrap_or(-1);
        info!(
            task = %ctx.task,
            exit_code = code,
            success = status.success(),
            "task process exited"
        );

        if !status.success() {
            bail!("command `{}` exited with code {}", self.cmd, code);
        }
        Ok(())
    }

    async fn run_long_lived(&self, ctx: &TaskContext) -> Result<()> {
        info!(task = %ctx.task, cmd = %self.cmd, "starting long-lived process");

        let mut child = self
            .build_command(ctx)
            .spawn()
            .with_context(|| format!("spawning `{}`", self.cmd))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_lines(
                ctx.task.clone(),
                "stderr",
                BufReader::new(stderr).lines(),
            ));
        }

        let mut stdout = child.stdout.take().map(|s| BufReader::new(s).lines());

        if let Some(ready) = &self.ready_on_stdout {
            let Some(lines) = stdout.as_mut() else {
                bail!("no stdout pipe available to wait for readiness");
            };

            loop {
                match lines.next_line().await? {
                    Some(line) => {
                        info!(task = %ctx.task, stream = "stdout", "{}", line);
                        if ready.is_match(&line) {
                            debug!(task = %ctx.task, pattern = %ready, "long-lived process is ready");
                            break;
                        }
                    }
                    None => {
                        let status = child.wait().await?;
                        bail!(
                            "`{}` exited with code {} before printing a line matching `{}`",
                            self.cmd,
                            status.code().unwrap_or(-1),
                            ready
                        );
                    }
                }
            }
        } else if let Some(status) = child.try_wait()? {
            if !status.success() {
                bail!(
                    "`{}` exited with code {} right after starting",
                    self.cmd,
                    status.code().unwrap_or(-1)
                );
            }
        }

        if let Some(lines) = stdout {
            tokio::spawn(forward_lines(ctx.task.clone(), "stdout", lines));
        }

        ctx.keeper.keep(&ctx.task, child);
        self.offer_url(ctx);
        Ok(())
    }

    fn offer_url(&self, ctx: &TaskContext) {
        let Some(url) = &self.open_url else {
            return;
        };

        if !ctx.open {
            info!(task = %ctx.task, %url, "Run with --open to automatically open URL on startup");
            return;
        }

        // The process is up; a missing browser does not fail the task.
        match ctx.opener.open(url) {
            Ok(()) => info!(task = %ctx.task, %url, "opened in browser"),
            Err(e) => warn!(task = %ctx.task, %url, error = %format!("{e:#}"), "failed to open browser"),
        }
    }
}

impl Action for ShellAction {
    fn execute<'a>(&'a self, ctx: &'a TaskContext) -> ActionFuture<'a> {
        Box::pin(async move {
            if self.long_lived {
                self.run_long_lived(ctx).await
            } else {
                self.run_to_exit(ctx).await
            }
        })
    }
}

/// Re-emit a child's output line by line as tracing events.
async fn forward_lines<R>(task: String, stream: &'static str, mut lines: Lines<BufReader<R>>)
where
    R: AsyncRead + Unpin,
{
    while let Ok(Some(line)) = lines.next_line().await {
        info!(task = %task, stream, "{}", line);
    }
}
