// src/supervisor/handler.rs

//! Report handling: echo, classify, apply.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::classify::{Classifier, Verdict};
use crate::report::ReportSink;
use crate::state::{DeathTracker, RunState};
use crate::types::ReportEvent;

/// Applies verdicts to the shared run state and death tracker.
///
/// Cheap to clone; all fields are shared.
#[derive(Debug, Clone)]
pub struct ReportHandler {
    classifier: Arc<Classifier>,
    run_state: Arc<RunState>,
    deaths: Arc<DeathTracker>,
    sink: Arc<ReportSink>,
}

impl ReportHandler {
    pub fn new(
        classifier: Arc<Classifier>,
        run_state: Arc<RunState>,
        deaths: Arc<DeathTracker>,
        sink: Arc<ReportSink>,
    ) -> Self {
        Self {
            classifier,
            run_state,
            deaths,
            sink,
        }
    }

    /// Handle a single report and return the verdict that was applied.
    pub fn handle(&self, event: &ReportEvent) -> Verdict {
        self.sink.runtime(&event.message);

        let verdict = self
            .classifier
            .classify(event, self.run_state.exit_was_requested());
        debug!(level = %event.level, ?verdict, "report classified");

        self.apply(&verdict, &event.message);
        verdict
    }

    fn apply(&self, verdict: &Verdict, message: &str) {
        match verdict {
            Verdict::None => {}
            Verdict::DeathBegin(component) => {
                if !self.deaths.begin(component.as_str()) {
                    debug!(component = %component, "component already in Death()");
                }
            }
            Verdict::DeathEnd(component) => {
                if !self.deaths.end(component) {
                    warn!(
                        component = %component,
                        "DEATH_FINISHED for a component that never reported LONG_DEATH"
                    );
                }
            }
            Verdict::TolerableError => {
                self.sink
                    .wrapper("Ignoring this error, because it is explicitly tolerated.");
            }
            Verdict::TimeoutFatalError => {
                self.sink.wrapper("TRIGGERING ABORT due to unexpected error ...");
                self.run_state.set_timeout_fatal(message);
            }
            Verdict::FatalError => {
                self.sink.wrapper("TRIGGERING ABORT due to unexpected error ...");
                self.run_state.set_fatal(message);
            }
            Verdict::ExitRequested => {
                info!("engine echoed an exit command; requesting shutdown");
                self.run_state.set_exit_requested();
            }
        }
    }
}
