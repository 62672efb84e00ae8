// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `diagwatch`.
///
/// `--run` and `--no-X11` exist so the tool can be dropped in where the
/// engine's own console runtime was invoked; they have no effect.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "diagwatch",
    version,
    about = "Run a data-flow diagram in the engine and exit with a code reflecting its outcome.",
    long_about = "Run a data-flow diagram in the engine and exit with a code reflecting its outcome.\n\
                  \n\
                  Exit codes: 0 = success, 1 = error, 2 = engine timeout error.\n\
                  \n\
                  Environment variables:\n  \
                  DIAGWATCH_TOLERATE_ERRORS  If \"true\" or \"1\", a reported error does not cause a shutdown\n  \
                  DIAGWATCH_LOG              Diagnostic log level if --log-level is omitted"
)]
pub struct CliArgs {
    /// Script (.rtm) or diagram (.rtd) to be executed.
    #[arg(value_name = "FILE")]
    pub file: String,

    /// Path to a log file; the start timestamp is prefixed to its name.
    #[arg(long, value_name = "PATH")]
    pub logfile: Option<String>,

    /// Optional supervisor config file (TOML).
    #[arg(long, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `DIAGWATCH_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Compatibility flag; the diagram is always started.
    #[arg(long)]
    pub run: bool,

    /// Compatibility flag; ignored.
    #[arg(long = "no-X11")]
    pub no_x11: bool,
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
