//! Shared helpers for diagwatch's integration tests.

pub mod capture;
pub mod fake_engine;

use std::future::Future;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

pub use capture::{CapturedSink, SharedBuffer, capture_sink};
pub use fake_engine::{EngineCall, FakeEngine, FakeEngineHandle, ScriptStep};

/// Route `tracing` output through the test harness.
///
/// Filtered by `DIAGWATCH_LOG` (default `warn`); output shows up for failing
/// tests or with `--nocapture`. Safe to call from every test.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("DIAGWATCH_LOG")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    // Only the first call per test binary installs the subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Await `fut`, failing the test if it takes longer than `limit` of real
/// time. Not for paused-clock tests.
pub async fn within<F: Future>(limit: Duration, fut: F) -> F::Output {
    match tokio::time::timeout(limit, fut).await {
        Ok(out) => out,
        Err(_) => panic!("test did not finish within {limit:?}"),
    }
}
