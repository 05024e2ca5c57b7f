//! Parsing of event-log lines back into records

use chrono::NaiveDateTime;
use seismo_core::edge::LOG_TIMESTAMP_FORMAT;
use thiserror::Error;

/// Why a log line could not be read back
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("line too short for a timestamp: {0:?}")]
    TooShort(String),

    #[error("bad timestamp {timestamp:?}: {message}")]
    Timestamp { timestamp: String, message: String },
}

/// One event-log line split into its fixed columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    /// Direction and line, e.g. `rising  17`
    pub event: String,
    /// Everything after the event column; `None` for truncated lines
    pub details: Option<String>,
}

impl LogRecord {
    /// Parse a line written by `EdgeEvent::log_line`
    pub fn parse(line: &str) -> Result<Self, RecordError> {
        let stamp = line
            .get(..19)
            .ok_or_else(|| RecordError::TooShort(line.to_string()))?;
        let timestamp = NaiveDateTime::parse_from_str(stamp, LOG_TIMESTAMP_FORMAT).map_err(|e| {
            RecordError::Timestamp {
                timestamp: stamp.to_string(),
                message: e.to_string(),
            }
        })?;

        let event = line.get(20..30).unwrap_or_else(|| line.get(20..).unwrap_or(""));
        let details = line.get(31..).filter(|d| !d.is_empty());

        Ok(Self {
            timestamp,
            event: event.trim_end().to_string(),
            details: details.map(str::to_string),
        })
    }

    /// Calendar date column, `YYYY-MM-DD`
    pub fn date(&self) -> String {
        self.timestamp.format("%Y-%m-%d").to_string()
    }

    /// Display time, `YYYY-MM-DD HH:MM:SS`
    pub fn time(&self) -> String {
        self.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}
