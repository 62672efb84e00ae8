// src/state/mod.rs

//! Per-run shared state: the run flags and the set of components in
//! `Death()`. Written by the report handler, read by the control loop.

pub mod death_tracker;
pub mod run_state;

pub use death_tracker::DeathTracker;
pub use run_state::{RunFlags, RunState};
