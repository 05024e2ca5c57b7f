//! Event sinks: the append-only text log and an in-memory variant

use parking_lot::Mutex;
use seismo_core::{EventSink, SinkError};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};

/// Append-only event log file
///
/// Opened once; the monitor loop is its only writer.
pub struct FileSink {
    path: PathBuf,
    file: Option<File>,
}

impl FileSink {
    /// Open (creating if needed) the event log for appending
    pub fn open(path: &Path) -> Result<Self, SinkError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut options = OpenOptions::new();
        options.create(true).append(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o664);
        }
        let file = options.open(path)?;

        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    /// Open the event log, or fall back to a sink that rejects every write
    ///
    /// Admission keeps working without durable storage; each failed append
    /// is logged by the gate.
    pub fn open_or_degraded(path: &Path) -> Self {
        match Self::open(path) {
            Ok(sink) => {
                info!("Event log opened: {}", path.display());
                sink
            }
            Err(e) => {
                error!("Failed to open event log {}: {}", path.display(), e);
                Self {
                    path: path.to_path_buf(),
                    file: None,
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.file.is_some()
    }
}

impl EventSink for FileSink {
    fn append(&mut self, line: &str) -> Result<(), SinkError> {
        let file = self.file.as_mut().ok_or(SinkError::NotOpen)?;
        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');
        // One write per line keeps concurrent readers from seeing half a record
        file.write_all(record.as_bytes())?;
        Ok(())
    }
}

/// In-memory sink whose clones share one buffer
///
/// Used for dry runs and tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lines.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.lock().is_empty()
    }
}

impl EventSink for MemorySink {
    fn append(&mut self, line: &str) -> Result<(), SinkError> {
        self.lines.lock().push(line.to_string());
        Ok(())
    }
}
