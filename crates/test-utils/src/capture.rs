use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use diagwatch::report::ReportSink;

/// In-memory writer that can be read back while a sink still owns a clone.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.inner.lock().unwrap()).into_owned()
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.contents().contains(needle)
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// A report sink writing into memory.
pub struct CapturedSink {
    pub sink: Arc<ReportSink>,
    pub console: SharedBuffer,
    pub errors: SharedBuffer,
}

pub fn capture_sink() -> CapturedSink {
    let console = SharedBuffer::new();
    let errors = SharedBuffer::new();
    let sink = Arc::new(ReportSink::with_writers(
        Box::new(console.clone()),
        Box::new(errors.clone()),
    ));
    CapturedSink {
        sink,
        console,
        errors,
    }
}
