use clap::Parser;

use diagwatch::cli::{CliArgs, LogLevel};

#[test]
fn test_minimal_invocation() {
    let args = CliArgs::try_parse_from(["diagwatch", "demo.rtd"]).unwrap();
    assert_eq!(args.file, "demo.rtd");
    assert!(args.logfile.is_none());
    assert!(args.config.is_none());
    assert!(args.log_level.is_none());
    assert!(!args.run);
    assert!(!args.no_x11);
}

#[test]
fn test_drop_in_compatibility_flags() {
    let args = CliArgs::try_parse_from([
        "diagwatch",
        "--run",
        "--no-X11",
        "--logfile",
        "logs/run.log",
        "--log-level",
        "debug",
        "scripts/replay.rtm",
    ])
    .unwrap();

    assert_eq!(args.file, "scripts/replay.rtm");
    assert_eq!(args.logfile.as_deref(), Some("logs/run.log"));
    assert!(matches!(args.log_level, Some(LogLevel::Debug)));
    assert!(args.run);
    assert!(args.no_x11);
}

#[test]
fn test_file_is_required() {
    assert!(CliArgs::try_parse_from(["diagwatch"]).is_err());
}

#[test]
fn test_version_flag() {
    let err = CliArgs::try_parse_from(["diagwatch", "--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
}

#[test]
fn test_log_directive_priority() {
    use diagwatch::logging::log_directive;

    assert_eq!(log_directive(None, None), "info");
    assert_eq!(log_directive(None, Some("  ")), "info");
    assert_eq!(
        log_directive(None, Some("diagwatch::supervisor=debug")),
        "diagwatch::supervisor=debug"
    );
    assert_eq!(log_directive(Some(LogLevel::Trace), Some("warn")), "trace");
    assert_eq!(log_directive(Some(LogLevel::Error), None), "error");
}
