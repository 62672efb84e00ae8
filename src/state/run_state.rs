// src/state/run_state.rs

use std::sync::{Mutex, MutexGuard, PoisonError};

/// Plain copy of the run flags, read under a single lock.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunFlags {
    pub fatal_error_seen: bool,
    pub timeout_error_seen: bool,
    pub exit_requested: bool,
    pub first_error_message: Option<String>,
}

/// Flags shared between the report handler and the control loop.
///
/// Every mutator updates all affected fields under one lock, so a reader
/// never observes `fatal_error_seen` without the message recorded with it.
/// The first recorded error message wins.
#[derive(Debug, Default)]
pub struct RunState {
    inner: Mutex<RunFlags>,
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RunFlags> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_fatal(&self, message: impl Into<String>) {
        let mut flags = self.lock();
        flags.fatal_error_seen = true;
        flags.first_error_message.get_or_insert_with(|| message.into());
    }

    pub fn set_timeout_fatal(&self, message: impl Into<String>) {
        let mut flags = self.lock();
        flags.fatal_error_seen = true;
        flags.timeout_error_seen = true;
        flags.first_error_message.get_or_insert_with(|| message.into());
    }

    pub fn set_exit_requested(&self) {
        self.lock().exit_requested = true;
    }

    pub fn has_fatal(&self) -> bool {
        self.lock().fatal_error_seen
    }

    pub fn has_timeout_fatal(&self) -> bool {
        self.lock().timeout_error_seen
    }

    pub fn exit_was_requested(&self) -> bool {
        self.lock().exit_requested
    }

    pub fn first_error(&self) -> Option<String> {
        self.lock().first_error_message.clone()
    }

    pub fn snapshot(&self) -> RunFlags {
        self.lock().clone()
    }
}
