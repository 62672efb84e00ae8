// src/binding/mod.rs

//! Engine binding abstraction.
//!
//! The supervisor talks to an `EngineBinding` instead of the engine itself.
//! The engine is an opaque, long-running task: it can be asked to load a
//! diagram, run and shut down, it can be polled for its clock, and it
//! pushes textual reports into a channel for the rest of the process.
//!
//! - [`ProcessEngine`] drives the engine's console runtime as a child
//!   process and is what `diagwatch` uses in production.
//! - Tests provide their own implementation that plays back a script of
//!   reports (see the `diagwatch-test-utils` crate).

use std::future::Future;
use std::path::Path;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::errors::{DiagwatchError, Result};
use crate::types::{DiagramKind, ReportEvent};

pub mod process;

pub use process::{ProcessEngine, parse_console_line};

/// Sending half handed to the engine. Sending never blocks.
pub type ReportSender = mpsc::UnboundedSender<ReportEvent>;
pub type ReportReceiver = mpsc::UnboundedReceiver<ReportEvent>;

pub type EngineFuture<'a> = Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>;

/// Lifecycle calls the supervisor needs from the engine.
pub trait EngineBinding: Send {
    /// Install the channel that receives every report from now on.
    fn register_report_channel(&mut self, reports: ReportSender);

    /// Load a diagram (`.rtd`) or script (`.rtm`).
    fn load_diagram<'a>(&'a mut self, path: &'a Path) -> EngineFuture<'a>;

    fn run(&mut self) -> EngineFuture<'_>;

    /// Request a shutdown. Must be safe to call more than once.
    fn shutdown(&mut self) -> EngineFuture<'_>;

    fn is_running(&self) -> bool;

    /// Engine clock; `0` means no diagram is running.
    fn current_time(&self) -> i64;
}

/// Check that `path` is an existing file with a diagram/script extension.
pub fn diagram_kind(path: &Path) -> Result<DiagramKind> {
    if !path.is_file() {
        return Err(DiagwatchError::InvalidDiagram(format!(
            "{} is not a file",
            path.display()
        )));
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    ext.parse::<DiagramKind>().map_err(|_| {
        DiagwatchError::InvalidDiagram(format!(
            "{} is not a valid diagram file",
            path.display()
        ))
    })
}
