// src/os_signals.rs

//! Host interrupt handling.
//!
//! [`wait_for_shutdown_signal`] completes when the process receives a
//! termination signal:
//! - Unix: SIGINT, SIGTERM, SIGQUIT, plus [`tokio::signal::ctrl_c`].
//! - elsewhere: [`tokio::signal::ctrl_c`] only.

use tokio::sync::mpsc;
use tracing::warn;

use crate::supervisor::HostSignal;

#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigquit = signal(SignalKind::quit())?;

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {},
        _ = sigint.recv()  => {},
        _ = sigterm.recv() => {},
        _ = sigquit.recv() => {},
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}

/// Forward every host interrupt into a channel for the supervisor.
///
/// The listener ends once the supervisor drops the receiver.
pub fn spawn_interrupt_listener() -> mpsc::Receiver<HostSignal> {
    let (tx, rx) = mpsc::channel(1);

    tokio::spawn(async move {
        loop {
            if let Err(e) = wait_for_shutdown_signal().await {
                warn!(error = %e, "failed to listen for interrupt signals");
                return;
            }
            if tx.send(HostSignal::Interrupt).await.is_err() {
                return;
            }
        }
    });

    rx
}
