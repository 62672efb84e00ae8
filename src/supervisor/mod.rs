// src/supervisor/mod.rs

//! Lifecycle supervisor for one diagram execution.
//!
//! This module ties together:
//! - the report handler (echo + classify + apply, see [`handler`])
//! - the pure phase decisions ([`core`])
//! - the async control loop reacting to:
//!   - the engine's clock and running state
//!   - fatal reports and exit requests
//!   - host interrupts
//!   - components still in `Death()`

use std::time::Duration;

use crate::config::SupervisorSection;
use crate::config::model::{DEFAULT_DEATH_TIMEOUT, DEFAULT_POLL_INTERVAL, DEFAULT_SHUTDOWN_GRACE};

pub mod core;
pub mod handler;
pub mod runtime;

pub use self::core::{Phase, StopReason};
pub use handler::ReportHandler;
pub use runtime::{Outcome, Supervisor};

/// Signals from the host environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostSignal {
    /// Ctrl-C / SIGINT / SIGTERM: treated as a graceful exit request.
    Interrupt,
}

/// Timing of the control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorOptions {
    pub poll_interval: Duration,
    pub shutdown_grace: Duration,
    pub death_timeout: Duration,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
            death_timeout: DEFAULT_DEATH_TIMEOUT,
        }
    }
}

impl From<&SupervisorSection> for SupervisorOptions {
    fn from(section: &SupervisorSection) -> Self {
        Self {
            poll_interval: section.poll_interval,
            shutdown_grace: section.shutdown_grace,
            death_timeout: section.death_timeout,
        }
    }
}
