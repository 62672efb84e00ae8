// src/report/sink.rs

//! User-facing log output.
//!
//! Each line is tagged with its origin and a local timestamp:
//!
//! ```text
//! [Wrapper][2024-05-02 13:37:00.123456] Loading diagram
//! [Runtime][2024-05-02 13:37:00.234567] Info: component Player_1: started
//! ```
//!
//! Lines go to the console writer (stdout in production) and, if attached,
//! to a log file. The final error summary additionally goes to the error
//! writer (stderr in production).

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

pub const WRAPPER_TAG: &str = "Wrapper";
pub const RUNTIME_TAG: &str = "Runtime";

pub const SUMMARY_HEADER: &str = "### Error summary: ###";
pub const SUMMARY_FOOTER: &str = "######################";

type BoxedWriter = Box<dyn Write + Send>;

pub struct ReportSink {
    console: Mutex<BoxedWriter>,
    errors: Mutex<BoxedWriter>,
    file: Mutex<Option<BoxedWriter>>,
}

impl std::fmt::Debug for ReportSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReportSink").finish_non_exhaustive()
    }
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

impl ReportSink {
    /// Sink writing to stdout / stderr.
    pub fn stdio() -> Self {
        Self::with_writers(Box::new(io::stdout()), Box::new(io::stderr()))
    }

    pub fn with_writers(console: BoxedWriter, errors: BoxedWriter) -> Self {
        Self {
            console: Mutex::new(console),
            errors: Mutex::new(errors),
            file: Mutex::new(None),
        }
    }

    /// Open `path` for appending and mirror every line into it.
    pub fn open_log_file(&self, path: &Path) -> io::Result<()> {
        let file: File = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "log file opened");
        self.attach_file(Box::new(file));
        Ok(())
    }

    pub fn attach_file(&self, writer: BoxedWriter) {
        *lock(&self.file) = Some(writer);
    }

    /// Flush and drop the log file; later lines only reach the console.
    pub fn close_file(&self) {
        if let Some(mut file) = lock(&self.file).take() {
            if let Err(e) = file.flush() {
                warn!(error = %e, "failed to flush log file");
            }
        }
    }

    /// A line produced by the supervisor itself.
    pub fn wrapper(&self, message: impl AsRef<str>) {
        self.tagged(WRAPPER_TAG, message.as_ref());
    }

    /// A line echoing an engine report.
    pub fn runtime(&self, message: impl AsRef<str>) {
        self.tagged(RUNTIME_TAG, message.as_ref());
    }

    fn tagged(&self, tag: &str, message: &str) {
        let line = format!("[{tag}][{}] {message}", timestamp());
        self.write_line(&line);
    }

    fn write_line(&self, line: &str) {
        {
            let mut console = lock(&self.console);
            if let Err(e) = writeln!(console, "{line}").and_then(|_| console.flush()) {
                debug!(error = %e, "failed to write to console");
            }
        }

        let mut file = lock(&self.file);
        if let Some(f) = file.as_mut() {
            if let Err(e) = writeln!(f, "{line}").and_then(|_| f.flush()) {
                warn!(error = %e, "failed to write to log file");
            }
        }
    }

    /// Write the error summary block.
    ///
    /// Does nothing for an empty summary.
    pub fn emit_error_summary(&self, lines: &[String]) {
        if lines.is_empty() {
            return;
        }

        self.wrapper(SUMMARY_HEADER);
        for line in lines {
            self.wrapper(format!("# {line}"));
        }
        self.wrapper(SUMMARY_FOOTER);

        let mut errors = lock(&self.errors);
        if let Err(e) = write!(errors, "{}", lines.join("\n")).and_then(|_| errors.flush()) {
            debug!(error = %e, "failed to write error summary");
        }
    }
}

fn timestamp() -> String {
    chrono::Local::now()
        .format("%Y-%m-%d %H:%M:%S%.6f")
        .to_string()
}
