// src/supervisor/runtime.rs

use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::binding::{EngineBinding, ReportReceiver};
use crate::classify::Classifier;
use crate::report::{ReportSink, format_error_summary};
use crate::state::{DeathTracker, RunState};
use crate::types::ExitStatus;

use super::core::{self, DeathWaitDecision, Phase, RunningDecision, StopReason};
use super::handler::ReportHandler;
use super::{HostSignal, SupervisorOptions};

/// Final result of a supervised run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit_status: ExitStatus,
    /// Lines of the error summary; empty when no error was recorded.
    pub error_summary: Vec<String>,
    pub stop_reason: StopReason,
}

/// Owns the receiving side of the report channel.
///
/// Whenever the supervisor waits (engine call or sleep), reports are handled
/// as they arrive; after each wait everything already queued is drained, so
/// decisions never miss a report sent before them.
struct ReportPump {
    events: ReportReceiver,
    handler: ReportHandler,
    open: bool,
}

impl ReportPump {
    fn drain(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            self.handler.handle(&event);
        }
    }

    async fn drive<F: Future>(&mut self, fut: F) -> F::Output {
        tokio::pin!(fut);

        let out = loop {
            tokio::select! {
                biased;
                out = &mut fut => break out,
                event = self.events.recv(), if self.open => match event {
                    Some(event) => {
                        self.handler.handle(&event);
                    }
                    None => {
                        debug!("report channel closed");
                        self.open = false;
                    }
                },
            }
        };

        self.drain();
        out
    }

    async fn sleep(&mut self, duration: Duration) {
        self.drive(tokio::time::sleep(duration)).await
    }
}

/// Drives one diagram execution from load to exit code.
///
/// Phases: `Init → Loading → Running → Stopping → WaitingDeath →
/// Terminated`. Every way of leaving `Loading`/`Running` (engine stopped,
/// fatal report, exit request, host interrupt, failed engine call) goes
/// through the same `Stopping`/`WaitingDeath` handling.
pub struct Supervisor<E: EngineBinding> {
    engine: E,
    options: SupervisorOptions,
    handler: ReportHandler,
    run_state: Arc<RunState>,
    deaths: Arc<DeathTracker>,
    sink: Arc<ReportSink>,
    interrupts: Option<mpsc::Receiver<HostSignal>>,
    phase: Phase,
}

impl<E: EngineBinding> std::fmt::Debug for Supervisor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Supervisor")
            .field("options", &self.options)
            .field("phase", &self.phase)
            .finish_non_exhaustive()
    }
}

impl<E: EngineBinding> Supervisor<E> {
    pub fn new(
        engine: E,
        options: SupervisorOptions,
        classifier: Classifier,
        sink: Arc<ReportSink>,
    ) -> Self {
        let run_state = Arc::new(RunState::new());
        let deaths = Arc::new(DeathTracker::new());
        let handler = ReportHandler::new(
            Arc::new(classifier),
            Arc::clone(&run_state),
            Arc::clone(&deaths),
            Arc::clone(&sink),
        );

        Self {
            engine,
            options,
            handler,
            run_state,
            deaths,
            sink,
            interrupts: None,
            phase: Phase::Init,
        }
    }

    /// Listen for host interrupts while loading and running.
    pub fn with_interrupts(mut self, interrupts: mpsc::Receiver<HostSignal>) -> Self {
        self.interrupts = Some(interrupts);
        self
    }

    pub fn run_state(&self) -> Arc<RunState> {
        Arc::clone(&self.run_state)
    }

    pub fn death_tracker(&self) -> Arc<DeathTracker> {
        Arc::clone(&self.deaths)
    }

    /// Supervise `diagram` until the process should exit.
    ///
    /// Always terminates: the death wait is bounded by
    /// `options.death_timeout`.
    pub async fn run(mut self, diagram: &Path) -> Outcome {
        let (report_tx, report_rx) = mpsc::unbounded_channel();
        let mut pump = ReportPump {
            events: report_rx,
            handler: self.handler.clone(),
            open: true,
        };

        self.enter(Phase::Loading);
        self.engine.register_report_channel(report_tx);

        let mut interrupts = self.interrupts.take();
        let driven = tokio::select! {
            res = self.load_and_run(diagram, &mut pump) => Some(res),
            _ = next_signal(&mut interrupts) => None,
        };

        let stop_reason = match driven {
            Some(Ok(reason)) => reason,
            Some(Err(e)) => {
                let message = format!("Exception: {e}");
                self.sink.wrapper(&message);
                self.run_state.set_fatal(message);
                StopReason::Abnormal
            }
            None => {
                self.sink.wrapper("Exit/Keyboard interrupt occurred");
                self.run_state.set_exit_requested();
                if let Err(e) = pump.drive(self.engine.shutdown()).await {
                    warn!(error = %e, "shutdown after interrupt failed");
                }
                StopReason::Interrupted
            }
        };
        info!(?stop_reason, "diagram execution ended");

        // Interrupts stay live until the process terminates.
        let finished = tokio::select! {
            _ = self.finish_shutdown(&mut pump) => true,
            _ = next_signal(&mut interrupts) => false,
        };
        if !finished {
            let message = format!("Exit/Keyboard interrupt occurred during {}", self.phase);
            warn!(phase = %self.phase, "host interrupt while waiting for shutdown");
            self.sink.wrapper(&message);
            self.run_state.set_fatal(message);
        }

        self.enter(Phase::Terminated);
        let flags = self.run_state.snapshot();
        let exit_status = core::exit_status(&flags);
        self.sink.wrapper(format!(
            "Terminating process with exit code {}",
            exit_status.code()
        ));

        let error_summary = format_error_summary(flags.first_error_message.as_deref());
        self.sink.emit_error_summary(&error_summary);
        self.sink.close_file();

        Outcome {
            exit_status,
            error_summary,
            stop_reason,
        }
    }

    async fn load_and_run(
        &mut self,
        diagram: &Path,
        pump: &mut ReportPump,
    ) -> crate::errors::Result<StopReason> {
        self.sink.wrapper("Loading diagram");
        pump.drive(self.engine.load_diagram(diagram)).await?;

        if core::needs_run_after_load(self.engine_active(), &self.run_state.snapshot()) {
            self.sink.wrapper("Diagram is not running --> calling 'run'");
            pump.drive(self.engine.run()).await?;
        }

        self.enter(Phase::Running);

        loop {
            pump.sleep(self.options.poll_interval).await;

            let decision = core::decide_running(
                self.engine.current_time() != 0,
                self.engine.is_running(),
                &self.run_state.snapshot(),
            );
            match decision {
                RunningDecision::Continue => {}
                RunningDecision::EngineStopped => {
                    return Ok(StopReason::EngineStopped);
                }
                RunningDecision::ShutdownOnError => {
                    self.sink
                        .wrapper("Stopping diagram, because an error was reported!");
                    pump.drive(self.engine.shutdown()).await?;
                    return Ok(StopReason::FatalError);
                }
                RunningDecision::ShutdownOnExitRequest => {
                    self.sink.wrapper("Stopping diagram, because exit was requested");
                    pump.drive(self.engine.shutdown()).await?;
                    return Ok(StopReason::ExitRequested);
                }
            }
        }
    }

    async fn finish_shutdown(&mut self, pump: &mut ReportPump) {
        self.enter(Phase::Stopping);
        self.sink.wrapper("Waiting for component shutdown");
        pump.sleep(self.options.shutdown_grace).await;

        self.enter(Phase::WaitingDeath);
        self.wait_for_deaths(pump).await;
    }

    async fn wait_for_deaths(&mut self, pump: &mut ReportPump) {
        let started = Instant::now();

        loop {
            pump.drain();
            let decision = core::decide_death_wait(
                !self.deaths.is_empty(),
                self.run_state.has_fatal(),
                started.elapsed(),
                self.options.death_timeout,
            );

            match decision {
                DeathWaitDecision::Done => return,
                DeathWaitDecision::Wait => pump.sleep(self.options.poll_interval).await,
                DeathWaitDecision::TimedOut => {
                    let components = self.deaths.snapshot();
                    let message = core::death_timeout_message(&components);
                    warn!(?components, "death timeout exceeded");
                    self.sink.wrapper(&message);
                    self.run_state.set_fatal(message);
                    return;
                }
            }
        }
    }

    fn engine_active(&self) -> bool {
        self.engine.current_time() != 0 && self.engine.is_running()
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "supervisor phase transition");
        self.phase = phase;
    }
}

/// Next host signal; never resolves when there is no (open) source.
async fn next_signal(interrupts: &mut Option<mpsc::Receiver<HostSignal>>) -> HostSignal {
    if let Some(rx) = interrupts.as_mut() {
        if let Some(signal) = rx.recv().await {
            return signal;
        }
    }
    std::future::pending().await
}
