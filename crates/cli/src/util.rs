//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use chrono::{DateTime, Local, TimeZone};
use seismo_journal::LogRecord;
use std::path::Path;
use std::time::SystemTime;

/// Format timestamp as relative time ("2 hours ago")
pub fn format_relative_time(ts_ms: u64) -> String {
    use std::time::{Duration, UNIX_EPOCH};

    let datetime = UNIX_EPOCH + Duration::from_millis(ts_ms);

    if let Ok(elapsed) = SystemTime::now().duration_since(datetime) {
        format_elapsed(elapsed.as_secs())
    } else {
        "in the future".to_string()
    }
}

fn format_elapsed(seconds: u64) -> String {
    if seconds < 60 {
        format!("{} seconds ago", seconds)
    } else if seconds < 3600 {
        format!("{} minutes ago", seconds / 60)
    } else if seconds < 86400 {
        format!("{} hours ago", seconds / 3600)
    } else if seconds < 604800 {
        format!("{} days ago", seconds / 86400)
    } else {
        format!("{} weeks ago", seconds / 604800)
    }
}

/// Format timestamp as local time ("2024-01-03 14:30:00")
pub fn format_absolute_time(ts_ms: u64) -> String {
    match Local.timestamp_millis_opt(ts_ms as i64).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => "unknown".to_string(),
    }
}

/// Milliseconds since the epoch for a file timestamp
pub fn system_time_ms(time: SystemTime) -> u64 {
    DateTime::<Local>::from(time).timestamp_millis().max(0) as u64
}

/// Format file size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Counts over the event log
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LogSummary {
    pub events: usize,
    pub today: usize,
    pub last: Option<LogRecord>,
}

/// Summarize an event log; a missing file counts as empty
///
/// Lines that are not valid UTF-8 are decoded lossily and then fail to parse,
/// so a damaged line is passed over instead of failing the whole summary.
pub fn summarize_log(path: &Path, today: &str) -> Result<LogSummary> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LogSummary::default()),
        Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
    };
    let contents = String::from_utf8_lossy(&bytes);

    let mut summary = LogSummary::default();
    for record in contents.lines().filter_map(|line| LogRecord::parse(line).ok()) {
        summary.events += 1;
        if record.date() == today {
            summary.today += 1;
        }
        summary.last = Some(record);
    }
    Ok(summary)
}
