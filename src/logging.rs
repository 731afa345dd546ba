// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! The filter comes from, in order:
//! 1. the `--log-level` flag
//! 2. the `RELEASEDAG_LOG` environment variable, which accepts full
//!    `EnvFilter` directives (`debug`, `releasedag::engine=trace,info`, ...)
//! 3. `info`
//!
//! Everything goes to stderr, including the re-emitted output of task
//! processes, so `--list` and `--dry-run` output on stdout stays clean.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Environment variable consulted when `--log-level` is absent.
pub const LOG_ENV_VAR: &str = "RELEASEDAG_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))
}

/// Resolve the filter from the flag and the raw environment value.
///
/// An unparsable environment value is an error rather than silently
/// falling back, so typos in `RELEASEDAG_LOG` are noticed.
pub fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(directive_for(level)));
    }

    match env_value.map(str::trim) {
        Some(raw) if !raw.is_empty() => EnvFilter::try_new(raw)
            .with_context(|| format!("invalid {LOG_ENV_VAR} value `{raw}`")),
        _ => Ok(EnvFilter::new(DEFAULT_DIRECTIVE)),
    }
}

fn directive_for(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
