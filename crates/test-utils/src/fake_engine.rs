use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;

use diagwatch::binding::{EngineBinding, EngineFuture, ReportSender};
use diagwatch::errors::DiagwatchError;
use diagwatch::types::ReportEvent;

/// A call the supervisor made into the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Load(PathBuf),
    Run,
    Shutdown,
}

/// One step of a scripted engine run.
#[derive(Debug, Clone)]
pub enum ScriptStep {
    Report(ReportEvent),
    Wait(Duration),
    /// The diagram stops on its own.
    Stop,
    /// `is_running()` turns false while the clock keeps ticking.
    StopKeepingClock,
}

#[derive(Debug, Default)]
struct FakeState {
    running: bool,
    clock_running: bool,
    started_at: Option<Instant>,
    calls: Vec<EngineCall>,
}

/// A fake engine that:
/// - records every lifecycle call
/// - plays back a script of reports once the diagram runs
/// - stops when `shutdown()` is called (unless told otherwise).
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
    reports: Option<ReportSender>,
    on_load: Vec<ReportEvent>,
    script: Vec<ScriptStep>,
    on_shutdown: Vec<ScriptStep>,
    stop_on_shutdown: bool,
    self_starting: bool,
    load_error: Option<String>,
}

/// Inspection handle that stays valid after the engine was moved into the
/// supervisor.
#[derive(Debug, Clone)]
pub struct FakeEngineHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngineHandle {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn count(&self, call: &EngineCall) -> usize {
        self.calls().iter().filter(|c| *c == call).count()
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(FakeState::default())),
            reports: None,
            on_load: Vec::new(),
            script: Vec::new(),
            on_shutdown: Vec::new(),
            stop_on_shutdown: true,
            self_starting: false,
            load_error: None,
        }
    }

    pub fn handle(&self) -> FakeEngineHandle {
        FakeEngineHandle {
            state: Arc::clone(&self.state),
        }
    }

    /// Report emitted while the diagram is being loaded.
    pub fn report_on_load(mut self, event: ReportEvent) -> Self {
        self.on_load.push(event);
        self
    }

    pub fn then_report(mut self, event: ReportEvent) -> Self {
        self.script.push(ScriptStep::Report(event));
        self
    }

    pub fn then_wait(mut self, duration: Duration) -> Self {
        self.script.push(ScriptStep::Wait(duration));
        self
    }

    pub fn then_stop(mut self) -> Self {
        self.script.push(ScriptStep::Stop);
        self
    }

    pub fn then_stop_keeping_clock(mut self) -> Self {
        self.script.push(ScriptStep::StopKeepingClock);
        self
    }

    /// Steps played back after `shutdown()` was called.
    pub fn on_shutdown(mut self, step: ScriptStep) -> Self {
        self.on_shutdown.push(step);
        self
    }

    /// `shutdown()` is recorded but the diagram keeps running.
    pub fn ignore_shutdown(mut self) -> Self {
        self.stop_on_shutdown = false;
        self
    }

    /// The loaded script starts the diagram itself.
    pub fn self_starting(mut self) -> Self {
        self.self_starting = true;
        self
    }

    pub fn fail_load(mut self, message: &str) -> Self {
        self.load_error = Some(message.to_string());
        self
    }

    fn record(&self, call: EngineCall) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn start(&self) {
        {
            let mut state = self.state.lock().unwrap();
            state.running = true;
            state.clock_running = true;
            state.started_at = Some(Instant::now());
        }
        self.play(self.script.clone());
    }

    fn play(&self, steps: Vec<ScriptStep>) {
        if steps.is_empty() {
            return;
        }
        let tx = self.reports.clone();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            for step in steps {
                match step {
                    ScriptStep::Report(event) => {
                        if let Some(tx) = &tx {
                            let _ = tx.send(event);
                        }
                    }
                    ScriptStep::Wait(d) => tokio::time::sleep(d).await,
                    ScriptStep::Stop => {
                        let mut state = state.lock().unwrap();
                        state.running = false;
                        state.clock_running = false;
                    }
                    ScriptStep::StopKeepingClock => state.lock().unwrap().running = false,
                }
            }
        });
    }
}

impl Default for FakeEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBinding for FakeEngine {
    fn register_report_channel(&mut self, reports: ReportSender) {
        self.reports = Some(reports);
    }

    fn load_diagram<'a>(&'a mut self, path: &'a std::path::Path) -> EngineFuture<'a> {
        Box::pin(async move {
            self.record(EngineCall::Load(path.to_path_buf()));
            if let Some(msg) = &self.load_error {
                return Err(DiagwatchError::InvalidDiagram(msg.clone()));
            }
            if let Some(tx) = &self.reports {
                for event in &self.on_load {
                    let _ = tx.send(event.clone());
                }
            }
            if self.self_starting {
                self.start();
            }
            Ok(())
        })
    }

    fn run(&mut self) -> EngineFuture<'_> {
        Box::pin(async move {
            self.record(EngineCall::Run);
            self.start();
            Ok(())
        })
    }

    fn shutdown(&mut self) -> EngineFuture<'_> {
        Box::pin(async move {
            self.record(EngineCall::Shutdown);
            if self.stop_on_shutdown {
                let mut state = self.state.lock().unwrap();
                state.running = false;
                state.clock_running = false;
            }
            let steps = std::mem::take(&mut self.on_shutdown);
            self.play(steps);
            Ok(())
        })
    }

    fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    fn current_time(&self) -> i64 {
        let state = self.state.lock().unwrap();
        match state.started_at {
            Some(started) if state.clock_running => {
                (started.elapsed().as_millis() as i64).max(1)
            }
            _ => 0,
        }
    }
}
