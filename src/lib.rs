// src/lib.rs

pub mod actions;
pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;
pub mod vcs;
pub mod watch;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::actions::{Services, registry_from_config};
use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::dag::{ExecutionPlan, ExecutionRequest, TaskRegistry};
use crate::engine::{RunOptions, Runner};
use crate::errors::ReleasedagError;
use crate::exec::TaskContext;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and registry construction
/// - the runner for the requested task or pipeline
/// - (optional) file watching
/// - Ctrl-C handling for watch mode and long-lived tasks
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_and_validate(&config_path)
        .with_context(|| format!("loading {}", config_path.display()))?;
    let root = config_root_dir(&config_path);

    let registry = Arc::new(registry_from_config(&cfg, &Services::default())?);

    if args.list {
        print_task_list(&mut io::stdout().lock(), &registry)?;
        return Ok(());
    }

    let target = match args.task.clone().or_else(|| cfg.settings().default.clone()) {
        Some(target) => target,
        None => {
            print_task_list(&mut io::stdout().lock(), &registry)?;
            return Err(ReleasedagError::InvalidInput(
                "no task given and no [config].default set".to_string(),
            )
            .into());
        }
    };

    let options = RunOptions {
        strict: !args.no_strict,
        jobs: args.jobs.or(cfg.settings().jobs_limit()),
    };
    let ctx = TaskContext::new(&root)
        .with_bump(args.bump)
        .with_open(args.open);
    let keeper = ctx.keeper.clone();

    let runner = Runner::new(Arc::clone(&registry), ctx).with_options(options);
    let request = ExecutionRequest::task(target.as_str());

    if args.dry_run {
        let plan = runner.plan(&request)?;
        print_plan(&mut io::stdout().lock(), &target, &plan)?;
        debug!("dry-run complete (no execution)");
        return Ok(());
    }

    let outcome = execute_and_watch(&args, &cfg, &runner, &request, &root).await;
    keeper.shutdown().await;
    outcome
}

async fn execute_and_watch(
    args: &CliArgs,
    cfg: &config::ConfigFile,
    runner: &Runner,
    request: &ExecutionRequest,
    root: &Path,
) -> Result<()> {
    let report = runner.execute(request).await?;
    info!(tasks = report.started.len(), "done");
    if !report.downgraded.is_empty() {
        warn!(tasks = ?report.downgraded, "lenient tasks failed");
    }

    let keeper = &runner.context().keeper;

    if args.watch {
        let profiles = watch::build_profiles(cfg.watch_rules())?;
        let watch_runner = runner.clone().with_options(RunOptions {
            strict: false,
            ..*runner.options()
        });
        return watch::watch_and_run(&watch_runner, root, profiles, ctrl_c()).await;
    }

    if !keeper.is_empty() {
        info!(processes = keeper.len(), "long-lived tasks running; press Ctrl-C to stop");
        ctrl_c().await;
    }

    Ok(())
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Figure out the project root.
///
/// - If the config path has a non-empty parent (e.g. "release/Releasedag.toml"),
///   we use that directory.
/// - If it's just a bare filename like "Releasedag.toml" (parent = ""),
///   we fall back to the current working directory "."
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}

/// Print tasks and pipelines with their descriptions and prerequisites.
pub fn print_task_list(out: &mut impl Write, registry: &TaskRegistry) -> io::Result<()> {
    writeln!(out, "Tasks:")?;
    for task in registry.tasks() {
        write!(out, "  {}", task.name())?;
        if let Some(description) = task.description() {
            write!(out, " - {description}")?;
        }
        writeln!(out)?;
        if !task.prerequisites().is_empty() {
            writeln!(out, "      after: {}", task.prerequisites().join(", "))?;
        }
    }

    let mut pipelines = registry.pipelines().peekable();
    if pipelines.peek().is_some() {
        writeln!(out)?;
        writeln!(out, "Pipelines:")?;
        for pipeline in pipelines {
            write!(out, "  {}", pipeline.name())?;
            if let Some(description) = pipeline.description() {
                write!(out, " - {description}")?;
            }
            writeln!(out)?;
            let steps: Vec<String> = pipeline
                .steps()
                .iter()
                .map(|group| format!("[{}]", group.members().join(", ")))
                .collect();
            writeln!(out, "      steps: {}", steps.join(" -> "))?;
        }
    }
    Ok(())
}

/// Print the stages and dependency levels of a resolved plan.
pub fn print_plan(out: &mut impl Write, target: &str, plan: &ExecutionPlan) -> io::Result<()> {
    writeln!(out, "releasedag dry-run: {target}")?;
    for stage in plan.stages() {
        writeln!(
            out,
            "stage {} [{}]:",
            stage.index() + 1,
            stage.requested().join(", ")
        )?;
        if stage.is_empty() {
            writeln!(out, "  (already done)")?;
            continue;
        }
        for (depth, level) in stage.levels().iter().enumerate() {
            writeln!(out, "  level {depth}: {}", level.join(", "))?;
        }
    }
    writeln!(out, "{} task(s) would run", plan.task_count())?;
    Ok(())
}
