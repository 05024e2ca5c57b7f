//! Edge sources
//!
//! - `gpio`: kernel GPIO character device (Linux, `gpio` feature)
//! - `replay`: text lines such as `rising 17`, for bench testing

#[cfg(all(target_os = "linux", feature = "gpio"))]
pub mod linux;
pub mod replay;

use crate::monitor::EdgeSender;
use seismo_core::{LineId, SensorConfig};
use std::collections::HashMap;
use thiserror::Error;

/// Edge source failures
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("GPIO edge source unavailable: {0}")]
    Unsupported(&'static str),

    #[error("failed to request line {line} on {chip}: {message}")]
    Request {
        chip: String,
        line: LineId,
        message: String,
    },

    #[error("no sensor line could be requested on {chip}")]
    NoLines { chip: String },

    #[error("malformed replay line {line_no}: {message}")]
    Parse { line_no: usize, message: String },

    #[error("edge loop is no longer receiving")]
    Closed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Assigns global and per-line sequence numbers for sources that lack them
#[derive(Debug, Default)]
pub struct SequenceCounter {
    global: u64,
    per_line: HashMap<LineId, u64>,
}

impl SequenceCounter {
    /// Returns `(global_seq, line_seq)` for the next edge on `line`, both from 1
    pub fn next(&mut self, line: LineId) -> (u64, u64) {
        self.global += 1;
        let line_seq = self.per_line.entry(line).or_insert(0);
        *line_seq += 1;
        (self.global, *line_seq)
    }
}

/// Handle to a running hardware source; dropping it does not stop the readers
#[derive(Debug)]
pub struct GpioSource {
    pub lines: Vec<LineId>,
    pub readers: Vec<std::thread::JoinHandle<()>>,
}

/// Request the configured sensor lines and start delivering their edges
#[cfg(all(target_os = "linux", feature = "gpio"))]
pub fn spawn_gpio_source(config: &SensorConfig, sender: EdgeSender) -> Result<GpioSource, SourceError> {
    linux::spawn(config, sender)
}

#[cfg(not(all(target_os = "linux", feature = "gpio")))]
pub fn spawn_gpio_source(_config: &SensorConfig, _sender: EdgeSender) -> Result<GpioSource, SourceError> {
    Err(SourceError::Unsupported(
        "seismo was built without the `gpio` feature or not for Linux",
    ))
}
