// src/binding/process.rs

//! Engine binding backed by the engine's console runtime process.
//!
//! The runtime is started with the diagram path as its last argument and
//! stdin/stdout/stderr piped:
//! - every console line becomes a [`ReportEvent`] (level taken from the
//!   `Info:` / `Warning:` / `Error:` prefix),
//! - `run()` and `shutdown()` write the corresponding console commands to
//!   stdin,
//! - the engine clock is derived from the time `run()` was issued.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, info, warn};

use super::{EngineBinding, EngineFuture, ReportSender, diagram_kind};
use crate::classify::EXIT_COMMAND;
use crate::config::EngineSection;
use crate::errors::{DiagwatchError, Result};
use crate::types::ReportEvent;

const RUN_COMMAND: &str = "run";
const SHUTDOWN_COMMAND: &str = "shutdown";

#[derive(Debug, Default)]
struct ProcessState {
    alive: bool,
    started_at: Option<Instant>,
    shutdown_sent: bool,
}

impl ProcessState {
    fn is_running(&self) -> bool {
        self.alive && self.started_at.is_some() && !self.shutdown_sent
    }
}

#[derive(Debug)]
pub struct ProcessEngine {
    program: String,
    args: Vec<String>,
    reports: Option<ReportSender>,
    stdin: Option<ChildStdin>,
    state: Arc<Mutex<ProcessState>>,
}

impl ProcessEngine {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            reports: None,
            stdin: None,
            state: Arc::new(Mutex::new(ProcessState::default())),
        }
    }

    pub fn from_config(engine: &EngineSection) -> Self {
        Self::new(engine.program.clone(), engine.args.clone())
    }

    fn state(&self) -> MutexGuard<'_, ProcessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn send_command(&mut self, command: &str) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| DiagwatchError::Engine("engine process is not started".to_string()))?;

        debug!(command, "sending console command to engine");
        stdin.write_all(format!("{command}\n").as_bytes()).await?;
        stdin.flush().await?;
        Ok(())
    }

    async fn spawn_runtime(&mut self, path: &std::path::Path) -> Result<()> {
        diagram_kind(path)?;
        if self.stdin.is_some() {
            return Err(DiagwatchError::Engine(
                "a diagram is already loaded in this engine".to_string(),
            ));
        }

        info!(program = %self.program, diagram = %path.display(), "starting engine runtime");

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            DiagwatchError::Engine(format!("spawning engine runtime '{}': {e}", self.program))
        })?;

        self.stdin = child.stdin.take();
        if let Some(stdout) = child.stdout.take() {
            spawn_console_reader("stdout", stdout, self.reports.clone());
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_console_reader("stderr", stderr, self.reports.clone());
        }

        self.state().alive = true;

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            match child.wait().await {
                Ok(status) => info!(
                    exit_code = status.code().unwrap_or(-1),
                    "engine runtime exited"
                ),
                Err(e) => warn!(error = %e, "failed to wait for engine runtime"),
            }
            state.lock().unwrap_or_else(PoisonError::into_inner).alive = false;
        });

        Ok(())
    }
}

impl EngineBinding for ProcessEngine {
    fn register_report_channel(&mut self, reports: ReportSender) {
        self.reports = Some(reports);
    }

    fn load_diagram<'a>(&'a mut self, path: &'a std::path::Path) -> EngineFuture<'a> {
        Box::pin(self.spawn_runtime(path))
    }

    fn run(&mut self) -> EngineFuture<'_> {
        Box::pin(async move {
            self.send_command(RUN_COMMAND).await?;
            let mut state = self.state();
            state.started_at = Some(Instant::now());
            state.shutdown_sent = false;
            Ok(())
        })
    }

    fn shutdown(&mut self) -> EngineFuture<'_> {
        Box::pin(async move {
            {
                let state = self.state();
                if !state.alive || state.shutdown_sent {
                    debug!("engine already stopped or stopping; ignoring shutdown");
                    return Ok(());
                }
            }

            // The runtime may exit between the check and the write.
            if let Err(e) = self.send_command(SHUTDOWN_COMMAND).await {
                debug!(error = %e, "could not deliver shutdown command");
            }
            self.state().shutdown_sent = true;
            Ok(())
        })
    }

    fn is_running(&self) -> bool {
        self.state().is_running()
    }

    fn current_time(&self) -> i64 {
        let state = self.state();
        match state.started_at {
            Some(started) if state.is_running() => {
                i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX).max(1)
            }
            _ => 0,
        }
    }
}

/// Convert one console line into a report event.
pub fn parse_console_line(line: &str) -> ReportEvent {
    let line = line.trim_end();
    if line.starts_with("Error:") {
        ReportEvent::error(line)
    } else if line.starts_with("Warning:") {
        ReportEvent::warning(line)
    } else if line == EXIT_COMMAND {
        ReportEvent::command(line)
    } else {
        ReportEvent::info(line)
    }
}

fn spawn_console_reader<R>(stream: &'static str, reader: R, reports: Option<ReportSender>)
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match &reports {
                Some(tx) => {
                    // Receiver gone means the supervisor is done.
                    if tx.send(parse_console_line(&line)).is_err() {
                        break;
                    }
                }
                None => debug!(stream, "engine: {}", line),
            }
        }

        debug!(stream, "engine console reader ended");
    });
}
