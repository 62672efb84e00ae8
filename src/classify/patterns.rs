// src/classify/patterns.rs

//! Regex tables used to grade `Error`-level reports.
//!
//! The engine's wording is the only contract we have, so the tables live
//! here, separate from the classifier logic, and can be extended from the
//! `[patterns]` section of the config file.

use regex::RegexSet;

use crate::config::PatternSection;
use crate::errors::{DiagwatchError, Result};

/// Errors that never abort a run.
pub const DEFAULT_TOLERATED: &[&str] = &[
    r"Error: component .*: (Interrupted|eof|Unable to request data!)",
    r"Error: component dSPACE_StructFilter.*",
    r"Error: Package .* already registered.*",
];

/// Errors that are expected once an exit was requested.
pub const DEFAULT_TOLERATED_IN_SHUTDOWN: &[&str] = &[
    r"Error: component .*: (Got receive exception:|Unable to request data!|Error while processing data: ) .*",
];

/// Errors that abort the run with the timeout exit code.
pub const DEFAULT_TIMEOUT: &[&str] = &[
    r"Error: component .*: (Timeout reached before packet arrival --> shutting down|Timeout reached before all players are done --> shutting down)",
];

/// Compiled pattern sets.
#[derive(Debug, Clone)]
pub struct PatternTable {
    tolerated: RegexSet,
    tolerated_in_shutdown: RegexSet,
    timeout: RegexSet,
}

impl PatternTable {
    /// Built-in patterns only.
    pub fn builtin() -> Self {
        // The defaults are constants covered by tests.
        Self::with_extra(&PatternSection::default()).expect("built-in patterns must compile")
    }

    /// Built-in patterns plus the extra ones from a `[patterns]` section.
    pub fn with_extra(extra: &PatternSection) -> Result<Self> {
        Ok(Self {
            tolerated: compile("tolerated", DEFAULT_TOLERATED, &extra.tolerated)?,
            tolerated_in_shutdown: compile(
                "tolerated_in_shutdown",
                DEFAULT_TOLERATED_IN_SHUTDOWN,
                &extra.tolerated_in_shutdown,
            )?,
            timeout: compile("timeout", DEFAULT_TIMEOUT, &extra.timeout)?,
        })
    }

    pub fn is_tolerated(&self, message: &str) -> bool {
        self.tolerated.is_match(message)
    }

    pub fn is_tolerated_in_shutdown(&self, message: &str) -> bool {
        self.tolerated_in_shutdown.is_match(message)
    }

    pub fn is_timeout(&self, message: &str) -> bool {
        self.timeout.is_match(message)
    }
}

impl Default for PatternTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn compile(set: &str, defaults: &[&str], extra: &[String]) -> Result<RegexSet> {
    let patterns = defaults
        .iter()
        .map(|s| s.to_string())
        .chain(extra.iter().cloned());

    RegexSet::new(patterns).map_err(|e| {
        DiagwatchError::ConfigError(format!("invalid pattern in [patterns].{set}: {e}"))
    })
}
