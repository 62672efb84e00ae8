// src/lib.rs

pub mod binding;
pub mod classify;
pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod os_signals;
pub mod report;
pub mod state;
pub mod supervisor;
pub mod types;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::binding::ProcessEngine;
use crate::classify::{Classifier, ClassifierSettings, PatternTable};
use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default, tolerate_override_from_env};
use crate::report::{ReportSink, format_error_summary, log_timestamp, timestamped_log_path};
use crate::supervisor::{Supervisor, SupervisorOptions};
use crate::types::ExitStatus;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - log file + report sink
/// - config file and environment overrides
/// - pattern table / classifier
/// - the process-backed engine binding
/// - Ctrl-C handling
/// - the supervisor
pub async fn run(args: CliArgs) -> ExitStatus {
    let sink = Arc::new(ReportSink::stdio());
    if let Some(ref logfile) = args.logfile {
        attach_log_file(&sink, Path::new(logfile));
    }

    run_with_sink(&args, sink).await
}

/// Everything after the sink is set up.
///
/// Startup failures are reported through `sink` like any other abnormal
/// termination, so they also reach the log file.
pub async fn run_with_sink(args: &CliArgs, sink: Arc<ReportSink>) -> ExitStatus {
    let Startup {
        cfg,
        diagram,
        classifier,
    } = match prepare(args) {
        Ok(startup) => startup,
        Err(e) => return report_startup_failure(&sink, &e),
    };

    sink.wrapper("Initializing engine");
    let engine = ProcessEngine::from_config(&cfg.engine);
    let interrupts = crate::os_signals::spawn_interrupt_listener();

    let supervisor = Supervisor::new(
        engine,
        SupervisorOptions::from(&cfg.supervisor),
        classifier,
        Arc::clone(&sink),
    )
    .with_interrupts(interrupts);

    let outcome = supervisor.run(&diagram).await;
    info!(exit_code = outcome.exit_status.code(), "supervisor finished");
    outcome.exit_status
}

struct Startup {
    cfg: ConfigFile,
    diagram: PathBuf,
    classifier: Classifier,
}

fn prepare(args: &CliArgs) -> Result<Startup> {
    let cfg = load_or_default(args.config.as_deref().map(Path::new))
        .context("loading configuration")?
        .with_tolerate_override(tolerate_override_from_env()?);
    debug!(?cfg, "configuration loaded");

    let classifier = build_classifier(&cfg)?;
    let diagram = enter_diagram_dir(Path::new(&args.file))?;

    Ok(Startup {
        cfg,
        diagram,
        classifier,
    })
}

fn report_startup_failure(sink: &ReportSink, err: &anyhow::Error) -> ExitStatus {
    let message = format!("Exception: {err:#}");
    warn!(error = %format!("{err:#}"), "startup failed");
    sink.wrapper(&message);

    let status = ExitStatus::Failed;
    sink.wrapper(format!("Terminating process with exit code {}", status.code()));
    sink.emit_error_summary(&format_error_summary(Some(&message)));
    sink.close_file();
    status
}

/// Build the classifier from the validated config.
pub fn build_classifier(cfg: &ConfigFile) -> Result<Classifier> {
    let patterns = PatternTable::with_extra(&cfg.patterns)?;
    let settings = ClassifierSettings {
        tolerate_all_errors: cfg.supervisor.tolerate_all_errors,
        engine_signals_exit: cfg.supervisor.engine_signals_exit,
    };
    Ok(Classifier::new(patterns, settings))
}

/// Mirror the sink into a timestamped log file; continue without one if
/// the path is unusable.
fn attach_log_file(sink: &ReportSink, logfile: &Path) {
    let stamp = log_timestamp(chrono::Local::now());
    let opened = timestamped_log_path(logfile, &stamp)
        .and_then(|path| sink.open_log_file(&path).map(|_| path));

    match opened {
        Ok(path) => info!(path = %path.display(), "writing log file"),
        Err(e) => {
            debug!(error = %e, "log file setup failed");
            sink.wrapper("Log file does not seem to be valid, file logging not possible");
        }
    }
}

/// Make the diagram path absolute and change into its directory so that
/// relative paths inside the diagram resolve.
fn enter_diagram_dir(file: &Path) -> Result<PathBuf> {
    let diagram = std::path::absolute(file)
        .with_context(|| format!("resolving diagram path {:?}", file))?;

    if let Some(dir) = diagram.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::env::set_current_dir(dir)
            .with_context(|| format!("changing into diagram directory {:?}", dir))?;
    }

    Ok(diagram)
}
