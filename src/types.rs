// src/types.rs

use std::fmt;
use std::str::FromStr;

/// Severity of a report event as emitted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportLevel {
    Info,
    Warning,
    Error,
    /// A console command echoed by the engine (e.g. `exit`).
    Command,
}

impl fmt::Display for ReportLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ReportLevel::Info => "info",
            ReportLevel::Warning => "warning",
            ReportLevel::Error => "error",
            ReportLevel::Command => "command",
        };
        f.write_str(s)
    }
}

/// A single textual report from the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportEvent {
    pub level: ReportLevel,
    pub message: String,
}

impl ReportEvent {
    pub fn new(level: ReportLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(ReportLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(ReportLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(ReportLevel::Error, message)
    }

    pub fn command(message: impl Into<String>) -> Self {
        Self::new(ReportLevel::Command, message)
    }
}

/// Final process outcome, mapped 1:1 to the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// No fatal error was seen.
    Success,
    /// A fatal error that was not a timeout.
    Failed,
    /// A fatal error classified as an engine timeout.
    TimedOut,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::Failed => 1,
            ExitStatus::TimedOut => 2,
        }
    }
}

/// Parse a truth value the way the wrapper's environment switch expects.
///
/// Accepts `y`, `yes`, `t`, `true`, `on`, `1` and `n`, `no`, `f`, `false`,
/// `off`, `0` (case-insensitive).
pub fn parse_truth_value(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "y" | "yes" | "t" | "true" | "on" | "1" => Ok(true),
        "n" | "no" | "f" | "false" | "off" | "0" => Ok(false),
        other => Err(format!("invalid truth value '{other}'")),
    }
}

/// Kind of file accepted by the engine's loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramKind {
    /// XML diagram (`.rtd`).
    Diagram,
    /// Command script (`.rtm`).
    Script,
}

impl FromStr for DiagramKind {
    type Err = String;

    /// Parse from a file extension (without the dot).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "rtd" => Ok(DiagramKind::Diagram),
            "rtm" => Ok(DiagramKind::Script),
            other => Err(format!(
                "unsupported diagram extension '{other}' (expected .rtd or .rtm)"
            )),
        }
    }
}
