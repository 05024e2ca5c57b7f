//! Edge events delivered by a sensor line

use chrono::{DateTime, Local, SecondsFormat};
use std::fmt;
use std::str::FromStr;

/// Offset of a sensor line on its GPIO chip
pub type LineId = u32;

/// Direction of an electrical transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Rising,
    Falling,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Rising => "rising",
            Direction::Falling => "falling",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` keeps width/alignment flags working for log columns
        f.pad(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rising" | "r" => Ok(Direction::Rising),
            "falling" | "f" => Ok(Direction::Falling),
            other => Err(format!("unknown edge direction: '{}'", other)),
        }
    }
}

/// One observation from an edge source
///
/// Immutable once built. The debounce gate borrows it for a single
/// processing step and the sink receives its formatted line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeEvent {
    direction: Direction,
    line: LineId,
    global_seq: u64,
    line_seq: u64,
    observed_at: DateTime<Local>,
    hardware_timestamp: String,
}

impl EdgeEvent {
    pub fn new(
        direction: Direction,
        line: LineId,
        global_seq: u64,
        line_seq: u64,
        observed_at: DateTime<Local>,
        hardware_timestamp: impl Into<String>,
    ) -> Self {
        Self {
            direction,
            line,
            global_seq,
            line_seq,
            observed_at,
            hardware_timestamp: hardware_timestamp.into(),
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn line(&self) -> LineId {
        self.line
    }

    pub fn global_seq(&self) -> u64 {
        self.global_seq
    }

    pub fn line_seq(&self) -> u64 {
        self.line_seq
    }

    pub fn observed_at(&self) -> DateTime<Local> {
        self.observed_at
    }

    /// Source-provided timestamp, kept verbatim for diagnostics
    pub fn hardware_timestamp(&self) -> &str {
        &self.hardware_timestamp
    }

    /// Identifier used by the pairing heuristic, e.g. `rising17`
    pub fn pairing_id(&self) -> String {
        format!("{}{}", self.direction.as_str(), self.line)
    }

    /// Summary columns without the leading timestamp
    ///
    /// `rising  17 event: #3(2) 2024-05-01T06:00:02.123456789+02:00 (12.5s)`
    pub fn summary(&self) -> String {
        format!(
            "{:<7}{:>3} event: #{}({}) {} ({})",
            self.direction,
            self.line,
            self.global_seq,
            self.line_seq,
            self.observed_at.to_rfc3339_opts(SecondsFormat::Nanos, false),
            self.hardware_timestamp
        )
    }

    /// Full event-log line (no trailing newline)
    ///
    /// Column layout is fixed: `[0..19]` local timestamp, `[20..30]`
    /// direction and line, `[31..]` details. Report parsing relies on it.
    pub fn log_line(&self) -> String {
        format!(
            "{} {}",
            self.observed_at.format(LOG_TIMESTAMP_FORMAT),
            self.summary()
        )
    }
}

/// Timestamp prefix of every event-log line
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(direction: Direction, line: LineId) -> EdgeEvent {
        let at = Local.with_ymd_and_hms(2024, 5, 1, 6, 0, 2).unwrap();
        EdgeEvent::new(direction, line, 3, 2, at, "12.5s")
    }

    #[test]
    fn test_log_line_columns() {
        let line = sample(Direction::Rising, 17).log_line();

        assert_eq!(&line[..19], "2024-05-01T06:00:02");
        assert_eq!(&line[19..20], " ");
        assert_eq!(&line[20..30], "rising  17");
        assert!(line[31..].starts_with("event: #3(2) 2024-05-01T06:00:02.000000000"));
        assert!(line.ends_with("(12.5s)"));
    }

    #[test]
    fn test_log_line_falling_single_digit() {
        let line = sample(Direction::Falling, 4).log_line();
        assert_eq!(&line[20..30], "falling  4");
    }

    #[test]
    fn test_log_line_widest_line_offset() {
        let line = sample(Direction::Rising, 999).log_line();
        assert_eq!(&line[20..30], "rising 999");
        assert!(line[31..].starts_with("event: #3(2)"));

        let line = sample(Direction::Falling, 999).log_line();
        assert_eq!(&line[20..30], "falling999");
    }

    #[test]
    fn test_pairing_id() {
        assert_eq!(sample(Direction::Rising, 17).pairing_id(), "rising17");
        assert_eq!(sample(Direction::Falling, 27).pairing_id(), "falling27");
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("rising".parse::<Direction>().unwrap(), Direction::Rising);
        assert_eq!("F".parse::<Direction>().unwrap(), Direction::Falling);
        assert!("sideways".parse::<Direction>().is_err());
    }
}
