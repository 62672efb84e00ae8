// src/report/log_path.rs

//! Log file naming.
//!
//! `--logfile logs/run.log` started at 2024-05-02 13:37:00 becomes
//! `<cwd>/logs/20240502_133700_run.log`, so repeated runs never overwrite
//! each other.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// Format of the file name prefix.
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub fn log_timestamp(at: DateTime<Local>) -> String {
    at.format(LOG_TIMESTAMP_FORMAT).to_string()
}

/// Absolute, timestamp-prefixed log path. Creates missing parent
/// directories.
pub fn timestamped_log_path(path: &Path, stamp: &str) -> io::Result<PathBuf> {
    let absolute = std::path::absolute(path)?;

    let file_name = absolute
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("log path {:?} has no file name", path),
            )
        })?;

    let stamped = absolute.with_file_name(format!("{stamp}_{file_name}"));

    if let Some(parent) = stamped.parent() {
        fs::create_dir_all(parent)?;
    }

    Ok(stamped)
}
