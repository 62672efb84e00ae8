// src/report/mod.rs

//! Reporting: the tagged log sink, the final error summary and log file
//! naming.

pub mod log_path;
pub mod sink;
pub mod summary;

pub use log_path::{log_timestamp, timestamped_log_path};
pub use sink::ReportSink;
pub use summary::format_error_summary;
