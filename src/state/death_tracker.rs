// src/state/death_tracker.rs

use std::collections::{BTreeSet, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Components currently inside a long-running `Death()` callback.
///
/// A component is present iff a `LONG_DEATH` was seen for it and no
/// `DEATH_FINISHED` since. Lives for one run; never reset.
#[derive(Debug, Default)]
pub struct DeathTracker {
    inner: Mutex<HashSet<String>>,
}

impl DeathTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `false` if the component was already tracked.
    pub fn begin(&self, component: impl Into<String>) -> bool {
        self.lock().insert(component.into())
    }

    /// Returns `false` if the component was not tracked (no-op).
    pub fn end(&self, component: &str) -> bool {
        self.lock().remove(component)
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn contains(&self, component: &str) -> bool {
        self.lock().contains(component)
    }

    /// Sorted copy, for stable log output.
    pub fn snapshot(&self) -> BTreeSet<String> {
        self.lock().iter().cloned().collect()
    }
}
