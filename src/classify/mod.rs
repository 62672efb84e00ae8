// src/classify/mod.rs

//! Event classification.
//!
//! Maps a single [`ReportEvent`] to a [`Verdict`]. This is a pure function of
//! the event, the pattern table, the static [`ClassifierSettings`] and one
//! bit of run state (whether an exit was already requested). Applying the
//! verdict is the job of [`crate::supervisor::ReportHandler`].

pub mod death;
pub mod patterns;

pub use death::{DeathMarker, DeathMarkerKind, parse_death_marker};
pub use patterns::PatternTable;

use crate::types::{ReportEvent, ReportLevel};

/// Console command that asks the engine to quit.
pub const EXIT_COMMAND: &str = "exit";

/// Semantic meaning of a report event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Nothing the supervisor needs to act on.
    None,
    /// A component entered a long-running `Death()` callback.
    DeathBegin(String),
    /// A component left its `Death()` callback.
    DeathEnd(String),
    /// An error that is explicitly expected; logged and ignored.
    TolerableError,
    /// An engine timeout; aborts the run with exit code 2.
    TimeoutFatalError,
    /// Any other error; aborts the run with exit code 1.
    FatalError,
    /// The engine echoed an `exit` command that it will not act on itself.
    ExitRequested,
}

impl Verdict {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Verdict::FatalError | Verdict::TimeoutFatalError)
    }
}

/// Static switches for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifierSettings {
    /// Treat every error as tolerable.
    pub tolerate_all_errors: bool,
    /// Whether the engine turns an `exit` command into a shutdown interrupt
    /// on its own. When it does, the echoed command is ignored here.
    pub engine_signals_exit: bool,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            tolerate_all_errors: false,
            engine_signals_exit: !cfg!(windows),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Classifier {
    patterns: PatternTable,
    settings: ClassifierSettings,
}

impl Classifier {
    pub fn new(patterns: PatternTable, settings: ClassifierSettings) -> Self {
        Self { patterns, settings }
    }

    /// Classify one event.
    ///
    /// `exit_requested` enables the shutdown-only tolerance patterns.
    pub fn classify(&self, event: &ReportEvent, exit_requested: bool) -> Verdict {
        match event.level {
            ReportLevel::Info => self.classify_info(&event.message),
            ReportLevel::Error => self.classify_error(&event.message, exit_requested),
            ReportLevel::Command => self.classify_command(&event.message),
            ReportLevel::Warning => Verdict::None,
        }
    }

    fn classify_info(&self, message: &str) -> Verdict {
        match parse_death_marker(message) {
            Some(DeathMarker {
                component,
                kind: DeathMarkerKind::Begin,
            }) => Verdict::DeathBegin(component),
            Some(DeathMarker {
                component,
                kind: DeathMarkerKind::End,
            }) => Verdict::DeathEnd(component),
            None => Verdict::None,
        }
    }

    fn classify_error(&self, message: &str, exit_requested: bool) -> Verdict {
        if self.settings.tolerate_all_errors || self.patterns.is_tolerated(message) {
            return Verdict::TolerableError;
        }
        if exit_requested && self.patterns.is_tolerated_in_shutdown(message) {
            return Verdict::TolerableError;
        }
        if self.patterns.is_timeout(message) {
            return Verdict::TimeoutFatalError;
        }
        Verdict::FatalError
    }

    fn classify_command(&self, message: &str) -> Verdict {
        if message == EXIT_COMMAND && !self.settings.engine_signals_exit {
            Verdict::ExitRequested
        } else {
            Verdict::None
        }
    }
}
