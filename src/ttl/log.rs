//! Append-only audit log for event emissions.
//!
//! One human-readable line per event, opened once at startup, never
//! rotated or truncated during a run. Log-write failures are reported but
//! never propagate into the emission path.

use chrono::{DateTime, Utc};
use log::error;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Timestamp format used on every log line.
const LINE_TIMESTAMP: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Append-only sink for event audit lines.
pub struct EventLog {
    sink: Box<dyn Write + Send>,
    path: Option<PathBuf>,
}

impl EventLog {
    /// Open the session log file inside `dir`.
    ///
    /// The file name carries the session start timestamp so runs never
    /// collide; the directory is created if missing. Opening is the only
    /// fallible step - subsequent writes degrade to warnings.
    pub fn create(dir: &Path, session_start: DateTime<Utc>) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "ttl_log_{}.txt",
            session_start.format("%Y%m%d_%H%M%S")
        ));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            sink: Box::new(file),
            path: Some(path),
        })
    }

    /// Wrap an arbitrary writer (used by tests and embedders).
    pub fn from_writer(sink: Box<dyn Write + Send>) -> Self {
        Self { sink, path: None }
    }

    /// Path of the backing file, if file-backed.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Append one line, prefixed with a wall-clock timestamp.
    ///
    /// Failures are logged and swallowed: the audit trail must never
    /// break the emission path.
    pub fn append(&mut self, message: &str) {
        let line = format!("{} | {}", Utc::now().format(LINE_TIMESTAMP), message);
        if let Err(e) = writeln!(self.sink, "{line}").and_then(|_| self.sink.flush()) {
            error!("could not write to event log: {e}");
        }
    }
}
