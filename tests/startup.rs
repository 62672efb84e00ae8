use std::fs;

use clap::Parser;
use tempfile::tempdir;

use diagwatch::cli::CliArgs;
use diagwatch::run_with_sink;
use diagwatch::types::ExitStatus;
use diagwatch_test_utils::{SharedBuffer, capture_sink, init_tracing};

#[tokio::test]
async fn missing_config_is_logged_to_the_log_file() {
    init_tracing();
    let dir = tempdir().unwrap();
    let config = dir.path().join("missing.toml");
    let args = CliArgs::try_parse_from([
        "diagwatch",
        "--config",
        config.to_str().unwrap(),
        "demo.rtd",
    ])
    .unwrap();

    let captured = capture_sink();
    let log_file = SharedBuffer::new();
    captured.sink.attach_file(Box::new(log_file.clone()));

    let status = run_with_sink(&args, captured.sink.clone()).await;

    assert_eq!(status, ExitStatus::Failed);
    assert!(log_file.contains("] Exception: loading configuration"));
    assert!(log_file.contains("Terminating process with exit code 1"));
    assert!(log_file.contains("### Error summary: ###"));
    assert!(!log_file.contains("Initializing engine"));
    assert!(captured.errors.contains("Exception: loading configuration"));

    // The file is closed once the failure is reported.
    captured.sink.wrapper("after close");
    assert!(!log_file.contains("after close"));
}

#[tokio::test]
async fn invalid_config_value_is_reported_as_exception() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("diagwatch.toml");
    fs::write(&config, "[supervisor]\ndeath_timeout = \"forever\"\n").unwrap();
    let args = CliArgs::try_parse_from([
        "diagwatch",
        "--config",
        config.to_str().unwrap(),
        "demo.rtd",
    ])
    .unwrap();

    let captured = capture_sink();
    let log_file = SharedBuffer::new();
    captured.sink.attach_file(Box::new(log_file.clone()));

    let status = run_with_sink(&args, captured.sink.clone()).await;

    assert_eq!(status, ExitStatus::Failed);
    assert!(log_file.contains("Exception: loading configuration"));
    assert!(log_file.contains("death_timeout"));
}
