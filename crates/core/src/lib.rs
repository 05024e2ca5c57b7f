//! Seismo Core - shared model for the vibration event logger
//!
//! This crate provides the pieces every other crate agrees on:
//! - Edge events and their log-line encoding
//! - The rising/falling pairing heuristic
//! - Configuration schema and validation
//! - The sink and report-trigger seams the debounce loop talks to

pub mod config;
pub mod edge;
pub mod error;
pub mod pairing;
pub mod sink;

// Re-export main types for convenience
pub use config::{Config, DebounceConfig, ScheduleConfig, SensorConfig, StorageConfig, MAX_LINE_OFFSET};
pub use edge::{Direction, EdgeEvent, LineId};
pub use error::{ConfigError, SinkError};
pub use pairing::are_paired;
pub use sink::{EventSink, ReportTrigger, TriggerReason};
