// src/cli.rs

//! CLI argument parsing using `clap`.

use std::num::NonZeroUsize;

use clap::{Parser, ValueEnum};

use crate::config::loader::DEFAULT_CONFIG_FILE;
use crate::types::BumpKind;

/// Command-line arguments for `releasedag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "releasedag",
    version,
    about = "Build and release a library by running a graph of tasks.",
    long_about = None
)]
pub struct CliArgs {
    /// Task or pipeline to run.
    ///
    /// Defaults to `[config].default` from the config file.
    #[arg(value_name = "TASK")]
    pub task: Option<String>,

    /// Path to the config file (TOML).
    #[arg(long, value_name = "PATH", default_value = DEFAULT_CONFIG_FILE)]
    pub config: String,

    /// Version increment used by bump tasks.
    #[arg(long = "type", value_enum, value_name = "TYPE")]
    pub bump: Option<BumpKind>,

    /// Ask long-lived tasks (e.g. the demo server) to open a browser.
    #[arg(long)]
    pub open: bool,

    /// Maximum number of tasks running at the same time.
    ///
    /// Overrides `[config].jobs`; unlimited when neither is set.
    #[arg(long, short = 'j', value_name = "N")]
    pub jobs: Option<NonZeroUsize>,

    /// Keep watching the project after the run and re-run `[[watch]]` rules.
    #[arg(long)]
    pub watch: bool,

    /// Downgrade failures of `lenient` tasks to warnings.
    #[arg(long)]
    pub no_strict: bool,

    /// Print the available tasks and pipelines, then exit.
    #[arg(long)]
    pub list: bool,

    /// Resolve the request and print the execution plan without running it.
    #[arg(long)]
    pub dry_run: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `RELEASEDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
