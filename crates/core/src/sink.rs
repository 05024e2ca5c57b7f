//! Seams between the debounce loop and its collaborators

use crate::error::SinkError;
use std::fmt;

/// Durable destination for admitted events
///
/// Receives one fully formatted line per admitted event. Implementations
/// append; they never rewrite earlier lines.
pub trait EventSink: Send {
    fn append(&mut self, line: &str) -> Result<(), SinkError>;
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn append(&mut self, line: &str) -> Result<(), SinkError> {
        (**self).append(line)
    }
}

/// Why a report regeneration was requested
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Process start
    Startup,
    /// No edges for the report-trigger period
    Quiescent,
    /// Calendar schedule
    Scheduled,
    /// Explicit request from the CLI
    Manual,
}

impl fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TriggerReason::Startup => "on start",
            TriggerReason::Quiescent => "on delay",
            TriggerReason::Scheduled => "schedule",
            TriggerReason::Manual => "manual",
        };
        f.write_str(s)
    }
}

/// Zero-argument "regenerate now" signal
///
/// Must return promptly: implementations run the actual work elsewhere and
/// report their own failures.
pub trait ReportTrigger: Send + Sync {
    fn regenerate(&self, reason: TriggerReason);
}

impl<T: ReportTrigger + ?Sized> ReportTrigger for std::sync::Arc<T> {
    fn regenerate(&self, reason: TriggerReason) {
        (**self).regenerate(reason)
    }
}
