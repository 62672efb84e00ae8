use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::mpsc;

use diagwatch::classify::{Classifier, ClassifierSettings, PatternTable};
use diagwatch::supervisor::{HostSignal, Outcome, StopReason, Supervisor, SupervisorOptions};
use diagwatch::types::{ExitStatus, ReportEvent};
use diagwatch_test_utils::{
    CapturedSink, EngineCall, FakeEngine, ScriptStep, capture_sink, init_tracing,
};

const DIAGRAM: &str = "/diagrams/demo.rtd";

const FATAL: &str = "Error: component Recorder_1: Unknown failure";
const TIMEOUT: &str =
    "Error: component Player_1: Timeout reached before packet arrival --> shutting down";

fn options() -> SupervisorOptions {
    SupervisorOptions {
        poll_interval: Duration::from_secs(1),
        shutdown_grace: Duration::from_secs(2),
        death_timeout: Duration::from_secs(30),
    }
}

fn classifier(settings: ClassifierSettings) -> Classifier {
    Classifier::new(PatternTable::builtin(), settings)
}

fn exit_via_supervisor() -> ClassifierSettings {
    ClassifierSettings {
        tolerate_all_errors: false,
        engine_signals_exit: false,
    }
}

async fn supervise(
    engine: FakeEngine,
    options: SupervisorOptions,
    settings: ClassifierSettings,
) -> (Outcome, CapturedSink) {
    init_tracing();
    let captured = capture_sink();
    let supervisor = Supervisor::new(engine, options, classifier(settings), captured.sink.clone());
    let outcome = supervisor.run(Path::new(DIAGRAM)).await;
    (outcome, captured)
}

#[tokio::test(start_paused = true)]
async fn clean_run_exits_zero_without_shutdown() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::info("Info: component Player_1: started"))
        .then_report(ReportEvent::warning("Warning: component Player_1: slow disk"))
        .then_wait(Duration::from_secs(3))
        .then_stop();
    let handle = engine.handle();

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert_eq!(outcome.stop_reason, StopReason::EngineStopped);
    assert!(outcome.error_summary.is_empty());

    assert_eq!(
        handle.calls(),
        vec![EngineCall::Load(PathBuf::from(DIAGRAM)), EngineCall::Run]
    );

    let console = captured.console.contents();
    assert!(console.contains("[Wrapper]["));
    assert!(console.contains("] Loading diagram"));
    assert!(console.contains("Diagram is not running --> calling 'run'"));
    assert!(console.contains("] Info: component Player_1: started"));
    assert!(console.contains("Terminating process with exit code 0"));
    assert!(!console.contains("Error summary"));
    assert!(captured.errors.contents().is_empty());
}

#[tokio::test(start_paused = true)]
async fn fatal_error_triggers_single_shutdown_and_exit_one() {
    let engine = FakeEngine::new()
        .then_wait(Duration::from_millis(500))
        .then_report(ReportEvent::error(FATAL))
        .then_report(ReportEvent::error("Error: component Recorder_1: follow-up failure"));
    let handle = engine.handle();

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Failed);
    assert_eq!(outcome.stop_reason, StopReason::FatalError);
    assert_eq!(outcome.error_summary, vec![FATAL.to_string()]);
    assert_eq!(handle.count(&EngineCall::Shutdown), 1);

    let console = captured.console.contents();
    assert!(console.contains("TRIGGERING ABORT"));
    assert!(console.contains("Stopping diagram, because an error was reported!"));
    assert!(console.contains("### Error summary: ###"));
    assert!(console.contains(&format!("# {FATAL}")));
    assert!(console.contains("Terminating process with exit code 1"));
    assert_eq!(captured.errors.contents(), FATAL);
}

#[tokio::test(start_paused = true)]
async fn timeout_error_exits_two() {
    let engine = FakeEngine::new().then_report(ReportEvent::error(TIMEOUT));
    let handle = engine.handle();

    let (outcome, _captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::TimedOut);
    assert_eq!(outcome.exit_status.code(), 2);
    assert_eq!(outcome.error_summary, vec![TIMEOUT.to_string()]);
    assert_eq!(handle.count(&EngineCall::Shutdown), 1);
}

#[tokio::test(start_paused = true)]
async fn tolerated_errors_do_not_stop_the_diagram() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::error("Error: component Player_1: eof"))
        .then_report(ReportEvent::error("Error: component CanBus_1: Unable to request data!"))
        .then_wait(Duration::from_secs(4))
        .then_stop();
    let handle = engine.handle();

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert_eq!(outcome.stop_reason, StopReason::EngineStopped);
    assert_eq!(handle.count(&EngineCall::Shutdown), 0);
    assert!(captured
        .console
        .contains("Ignoring this error, because it is explicitly tolerated."));
}

#[tokio::test(start_paused = true)]
async fn tolerate_all_errors_keeps_exit_zero() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::error(FATAL))
        .then_report(ReportEvent::error(TIMEOUT))
        .then_wait(Duration::from_secs(2))
        .then_stop();
    let handle = engine.handle();

    let settings = ClassifierSettings {
        tolerate_all_errors: true,
        ..ClassifierSettings::default()
    };
    let (outcome, _captured) = supervise(engine, options(), settings).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert!(outcome.error_summary.is_empty());
    assert_eq!(handle.count(&EngineCall::Shutdown), 0);
}

#[tokio::test(start_paused = true)]
async fn stuck_component_hits_death_timeout() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::info("Info: component X: entering Death() LONG_DEATH"))
        .then_stop();

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Failed);
    assert_eq!(
        outcome.error_summary,
        vec!["Death timeout while [X] is still in Death() method.".to_string()]
    );
    assert!(captured.console.contains("Death timeout while [X]"));
}

#[tokio::test(start_paused = true)]
async fn death_wait_is_bounded_by_default_timeout() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::info("Info: component X: entering Death() LONG_DEATH"))
        .then_stop();

    let started = tokio::time::Instant::now();
    let (outcome, _captured) =
        supervise(engine, SupervisorOptions::default(), ClassifierSettings::default()).await;
    let elapsed = started.elapsed();

    assert_eq!(outcome.exit_status, ExitStatus::Failed);
    assert!(outcome.error_summary[0].contains("X"));
    assert!(elapsed > Duration::from_secs(1800));
    assert!(elapsed < Duration::from_secs(1900));
}

#[tokio::test(start_paused = true)]
async fn death_finished_during_wait_exits_zero() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::command("exit"))
        .on_shutdown(ScriptStep::Report(ReportEvent::info(
            "Info: component X: entering Death() LONG_DEATH",
        )))
        .on_shutdown(ScriptStep::Wait(Duration::from_secs(5)))
        .on_shutdown(ScriptStep::Report(ReportEvent::info(
            "Info: component X: leaving Death() DEATH_FINISHED",
        )));
    let handle = engine.handle();

    let started = tokio::time::Instant::now();
    let (outcome, captured) = supervise(engine, options(), exit_via_supervisor()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert_eq!(outcome.stop_reason, StopReason::ExitRequested);
    assert!(outcome.error_summary.is_empty());
    assert_eq!(handle.count(&EngineCall::Shutdown), 1);
    assert!(started.elapsed() < Duration::from_secs(30));
    assert!(!captured.console.contains("Death timeout"));
}

#[tokio::test(start_paused = true)]
async fn exit_command_requests_shutdown_and_tolerates_shutdown_noise() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::command("exit"))
        .on_shutdown(ScriptStep::Report(ReportEvent::error(
            "Error: component Udp_1: Got receive exception: connection reset",
        )));
    let handle = engine.handle();

    let (outcome, captured) = supervise(engine, options(), exit_via_supervisor()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert_eq!(outcome.stop_reason, StopReason::ExitRequested);
    assert_eq!(handle.count(&EngineCall::Shutdown), 1);
    assert!(captured
        .console
        .contains("Stopping diagram, because exit was requested"));
}

#[tokio::test(start_paused = true)]
async fn exit_command_is_ignored_when_engine_signals_exit_itself() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::command("exit"))
        .then_wait(Duration::from_secs(3))
        .then_stop();
    let handle = engine.handle();

    let settings = ClassifierSettings {
        tolerate_all_errors: false,
        engine_signals_exit: true,
    };
    let (outcome, _captured) = supervise(engine, options(), settings).await;

    assert_eq!(outcome.stop_reason, StopReason::EngineStopped);
    assert_eq!(handle.count(&EngineCall::Shutdown), 0);
}

#[tokio::test(start_paused = true)]
async fn host_interrupt_shuts_down_gracefully() {
    init_tracing();
    let engine = FakeEngine::new();
    let handle = engine.handle();
    let captured = capture_sink();

    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(3)).await;
        let _ = tx.send(HostSignal::Interrupt).await;
    });

    let supervisor = Supervisor::new(
        engine,
        options(),
        classifier(ClassifierSettings::default()),
        captured.sink.clone(),
    )
    .with_interrupts(rx);
    let run_state = supervisor.run_state();
    let outcome = supervisor.run(Path::new(DIAGRAM)).await;

    assert_eq!(outcome.stop_reason, StopReason::Interrupted);
    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert!(run_state.exit_was_requested());
    assert_eq!(handle.count(&EngineCall::Shutdown), 1);
    assert!(!handle.is_running());
    assert!(captured.console.contains("Exit/Keyboard interrupt occurred"));
}

#[tokio::test(start_paused = true)]
async fn failed_load_is_reported_as_exception() {
    let engine = FakeEngine::new().fail_load("demo.rtd could not be parsed");
    let handle = engine.handle();

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Failed);
    assert_eq!(outcome.stop_reason, StopReason::Abnormal);
    assert_eq!(outcome.error_summary.len(), 1);
    assert!(outcome.error_summary[0].starts_with("Exception:"));
    assert!(outcome.error_summary[0].contains("demo.rtd could not be parsed"));
    assert_eq!(handle.count(&EngineCall::Run), 0);
    assert!(captured.errors.contains("Exception:"));
}

#[tokio::test(start_paused = true)]
async fn fatal_report_during_load_skips_run() {
    let engine = FakeEngine::new().report_on_load(ReportEvent::error(FATAL));
    let handle = engine.handle();

    let (outcome, _captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Failed);
    assert_eq!(outcome.error_summary, vec![FATAL.to_string()]);
    assert_eq!(handle.count(&EngineCall::Run), 0);
}

#[tokio::test(start_paused = true)]
async fn self_starting_script_is_not_run_again() {
    let engine = FakeEngine::new()
        .self_starting()
        .then_wait(Duration::from_secs(2))
        .then_stop();
    let handle = engine.handle();

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert_eq!(handle.count(&EngineCall::Run), 0);
    assert!(!captured.console.contains("calling 'run'"));
}

#[tokio::test(start_paused = true)]
async fn traceback_is_collapsed_in_summary() {
    let traceback = "Error: component PyBlock_1: Traceback (most recent call last):\n  \
                     File \"block.py\", line 42, in Core\n    \
                     raise ValueError(\"bad input\")\n\
                     ValueError: bad input";
    let engine = FakeEngine::new().then_report(ReportEvent::error(traceback));

    let (outcome, captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(
        outcome.error_summary,
        vec![
            "Error: component PyBlock_1:".to_string(),
            "ValueError: bad input".to_string(),
        ]
    );
    assert_eq!(
        captured.errors.contents(),
        "Error: component PyBlock_1:\nValueError: bad input"
    );
}

#[tokio::test(start_paused = true)]
async fn finished_death_before_stop_exits_zero() {
    let engine = FakeEngine::new()
        .then_report(ReportEvent::info("Info: component CamSensor: entering Death() LONG_DEATH"))
        .then_wait(Duration::from_millis(300))
        .then_report(ReportEvent::info("Info: component CamSensor: leaving Death() DEATH_FINISHED"))
        .then_stop();

    let captured = capture_sink();
    let supervisor = Supervisor::new(
        engine,
        options(),
        classifier(ClassifierSettings::default()),
        captured.sink.clone(),
    );
    let deaths = supervisor.death_tracker();
    let outcome = supervisor.run(Path::new(DIAGRAM)).await;

    assert_eq!(outcome.exit_status, ExitStatus::Success);
    assert!(outcome.error_summary.is_empty());
    assert!(deaths.is_empty());
}

#[tokio::test(start_paused = true)]
async fn interrupt_during_death_wait_ends_the_wait() {
    init_tracing();
    let engine = FakeEngine::new()
        .then_report(ReportEvent::info("Info: component X: entering Death() LONG_DEATH"))
        .then_stop();
    let captured = capture_sink();

    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(10)).await;
        let _ = tx.send(HostSignal::Interrupt).await;
    });

    let supervisor = Supervisor::new(
        engine,
        SupervisorOptions::default(),
        classifier(ClassifierSettings::default()),
        captured.sink.clone(),
    )
    .with_interrupts(rx);

    let started = tokio::time::Instant::now();
    let outcome = supervisor.run(Path::new(DIAGRAM)).await;

    assert!(started.elapsed() < Duration::from_secs(15));
    assert_eq!(outcome.stop_reason, StopReason::EngineStopped);
    assert_eq!(outcome.exit_status, ExitStatus::Failed);
    assert_eq!(
        outcome.error_summary,
        vec!["Exit/Keyboard interrupt occurred during waiting-death".to_string()]
    );
    assert!(captured
        .console
        .contains("Exit/Keyboard interrupt occurred during waiting-death"));
    assert!(!captured.console.contains("Death timeout"));
}

#[tokio::test(start_paused = true)]
async fn pending_fatal_error_still_shuts_down_a_non_running_engine() {
    // The clock keeps ticking although the engine reports itself stopped.
    let engine = FakeEngine::new()
        .then_report(ReportEvent::error(FATAL))
        .then_stop_keeping_clock();
    let handle = engine.handle();

    let (outcome, _captured) = supervise(engine, options(), ClassifierSettings::default()).await;

    assert_eq!(outcome.stop_reason, StopReason::FatalError);
    assert_eq!(handle.count(&EngineCall::Shutdown), 1);
}
