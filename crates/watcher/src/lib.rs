//! Edge watching and debouncing for Seismo
//!
//! This crate provides:
//! - Re-armable deadline timers
//! - The debounce gate (admit/suppress state machine)
//! - The single-consumer monitor loop tying edges to timers
//! - Calendar-based report scheduling
//! - Edge sources (GPIO character device, text replay)

pub mod debounce;
pub mod monitor;
pub mod platform;
pub mod schedule;
pub mod timer;

// Re-exports
pub use debounce::{Admission, DebounceGate, GateStats};
pub use monitor::{edge_channel, Arrival, EdgeReceiver, EdgeSender, GateSnapshot, Monitor};
pub use platform::{spawn_gpio_source, GpioSource, SequenceCounter, SourceError};
pub use schedule::{CalendarSchedule, ReportScheduler};
pub use timer::DeadlineTimer;
