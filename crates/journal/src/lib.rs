//! Event log storage and report generation
//!
//! This crate provides:
//! - Append-only text event log (`FileSink`)
//! - In-memory sink for dry runs and tests
//! - Log record parsing (fixed column layout)
//! - HTML report rendering and the background `ReportGenerator`

pub mod record;
pub mod report;
pub mod sink;

// Re-exports
pub use record::{LogRecord, RecordError};
pub use report::{render_report, write_report, ReportError, ReportGenerator, ReportSummary};
pub use sink::{FileSink, MemorySink};
