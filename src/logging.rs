// src/logging.rs

//! Diagnostic logging via `tracing`.
//!
//! The filter comes from `--log-level`, else from `DIAGWATCH_LOG` (any
//! `EnvFilter` directive, e.g. `diagwatch::supervisor=debug`), else `info`.
//! Diagnostics go to stderr; the `[Wrapper]`/`[Runtime]` lines on stdout are
//! the job of [`crate::report::ReportSink`].

use anyhow::{Result, anyhow};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV: &str = "DIAGWATCH_LOG";

const DEFAULT_DIRECTIVE: &str = "info";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let directive = log_directive(cli_level, env.as_deref());

    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
        eprintln!("ignoring {LOG_ENV}={directive:?}: {e}");
        EnvFilter::new(DEFAULT_DIRECTIVE)
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("installing log subscriber: {e}"))
}

/// Filter directive for the given CLI flag and environment value.
pub fn log_directive(cli_level: Option<LogLevel>, env: Option<&str>) -> String {
    if let Some(level) = cli_level {
        return level_directive(level).to_string();
    }
    env.map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(DEFAULT_DIRECTIVE)
        .to_string()
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
