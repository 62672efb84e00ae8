// src/supervisor/core.rs

//! Pure lifecycle decisions.
//!
//! The async shell in [`super::runtime`] owns the engine, the clock and the
//! report channel; every decision it takes is delegated to the functions
//! here, which only look at plain values and are unit tested without Tokio.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use crate::state::RunFlags;
use crate::types::ExitStatus;

/// Supervisor lifecycle phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Loading,
    Running,
    Stopping,
    WaitingDeath,
    Terminated,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Phase::Init => "init",
            Phase::Loading => "loading",
            Phase::Running => "running",
            Phase::Stopping => "stopping",
            Phase::WaitingDeath => "waiting-death",
            Phase::Terminated => "terminated",
        };
        f.write_str(s)
    }
}

/// Why the supervisor left `Loading`/`Running`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The engine stopped on its own.
    EngineStopped,
    /// A fatal error was reported; shutdown was issued.
    FatalError,
    /// The engine echoed an exit request; shutdown was issued.
    ExitRequested,
    /// Host interrupt (Ctrl-C, SIGTERM); shutdown was issued.
    Interrupted,
    /// An engine call failed.
    Abnormal,
}

/// Result of one `Running` poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunningDecision {
    Continue,
    /// Stop without calling `shutdown()`.
    EngineStopped,
    ShutdownOnError,
    ShutdownOnExitRequest,
}

/// Decide what to do on a `Running` poll tick.
///
/// Checked in order: engine clock, fatal error, exit request, engine
/// running state. A stopped clock ends the run without a shutdown call; a
/// pending fatal error or exit request still issues one when the clock runs
/// but the engine already reports itself as not running.
pub fn decide_running(clock_running: bool, engine_running: bool, flags: &RunFlags) -> RunningDecision {
    if !clock_running {
        RunningDecision::EngineStopped
    } else if flags.fatal_error_seen {
        RunningDecision::ShutdownOnError
    } else if flags.exit_requested {
        RunningDecision::ShutdownOnExitRequest
    } else if !engine_running {
        RunningDecision::EngineStopped
    } else {
        RunningDecision::Continue
    }
}

/// Whether `run()` must be issued after loading.
pub fn needs_run_after_load(engine_active: bool, flags: &RunFlags) -> bool {
    !engine_active && !flags.fatal_error_seen
}

/// Result of one `WaitingDeath` check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathWaitDecision {
    /// Nothing left to wait for (or a fatal error makes waiting pointless).
    Done,
    Wait,
    TimedOut,
}

pub fn decide_death_wait(
    deaths_pending: bool,
    fatal_error_seen: bool,
    elapsed: Duration,
    timeout: Duration,
) -> DeathWaitDecision {
    if !deaths_pending || fatal_error_seen {
        DeathWaitDecision::Done
    } else if elapsed > timeout {
        DeathWaitDecision::TimedOut
    } else {
        DeathWaitDecision::Wait
    }
}

pub fn death_timeout_message(components: &BTreeSet<String>) -> String {
    let names: Vec<&str> = components.iter().map(String::as_str).collect();
    format!(
        "Death timeout while [{}] is still in Death() method.",
        names.join(", ")
    )
}

/// Map the final flags to the exit status.
pub fn exit_status(flags: &RunFlags) -> ExitStatus {
    match (flags.fatal_error_seen, flags.timeout_error_seen) {
        (false, _) => ExitStatus::Success,
        (true, true) => ExitStatus::TimedOut,
        (true, false) => ExitStatus::Failed,
    }
}
