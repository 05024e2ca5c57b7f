//! Debounce gate
//!
//! Decides, per edge, whether it starts a new physical event or is ringing
//! from one already admitted.
//!
//! ```text
//! Idle (suppressed = false) --edge--> Active (suppressed = true) --window expiry--> Idle
//! Active --edge--> Active (suppressed_count += 1)
//! ```
//!
//! Admission opens a suppress window of fixed length. Edges inside the
//! window are counted and dropped and do *not* extend it, so a noise burst
//! longer than the window admits a second event mid-burst. Every edge,
//! admitted or not, pushes the report trigger back.

use crate::timer::DeadlineTimer;
use seismo_core::{DebounceConfig, EdgeEvent, EventSink};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// Outcome of [`DebounceGate::handle_edge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Forwarded to the sink as a new event
    Admitted,
    /// Dropped as noise; `count` edges dropped so far in this window
    Suppressed { count: u64 },
}

/// Lifetime counters, for diagnostics only
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateStats {
    pub admitted: u64,
    pub suppressed: u64,
    pub sink_failures: u64,
    pub windows_closed: u64,
}

pub struct DebounceGate<S> {
    sink: S,
    suppressed: bool,
    suppressed_count: u64,
    suppress_window: DeadlineTimer,
    report_trigger: DeadlineTimer,
    stats: GateStats,
}

impl<S: EventSink> DebounceGate<S> {
    pub fn new(sink: S, suppress_window: Duration, report_trigger: Duration) -> Self {
        Self {
            sink,
            suppressed: false,
            suppressed_count: 0,
            suppress_window: DeadlineTimer::new(suppress_window),
            report_trigger: DeadlineTimer::new(report_trigger),
            stats: GateStats::default(),
        }
    }

    pub fn from_config(sink: S, config: &DebounceConfig) -> Self {
        Self::new(sink, config.suppress_window(), config.report_trigger())
    }

    /// Process one edge that arrived at `at`
    pub fn handle_edge(&mut self, event: &EdgeEvent, at: Instant) -> Admission {
        // The window may have elapsed before this edge arrived even if the
        // loop has not serviced the expiry yet.
        self.poll_suppress_window(at);

        self.report_trigger.rearm(at);

        if self.suppressed {
            self.suppressed_count += 1;
            self.stats.suppressed += 1;
            debug!(
                line = event.line(),
                direction = %event.direction(),
                count = self.suppressed_count,
                "edge suppressed"
            );
            return Admission::Suppressed {
                count: self.suppressed_count,
            };
        }

        self.suppressed = true;
        self.suppress_window.rearm(at);
        self.stats.admitted += 1;

        // A failed write does not undo the admission
        match self.sink.append(&event.log_line()) {
            Ok(()) => info!(">> {}", event.summary()),
            Err(e) => {
                self.stats.sink_failures += 1;
                error!(error = %e, "failed to record event: {}", event.summary());
            }
        }

        Admission::Admitted
    }

    /// Close the suppress window if it has expired by `now`
    ///
    /// Returns the number of edges discarded during the closed window.
    pub fn poll_suppress_window(&mut self, now: Instant) -> Option<u64> {
        if self.suppress_window.take_expired(now) {
            Some(self.close_window())
        } else {
            None
        }
    }

    /// True once per quiet period: no edge for the report-trigger duration
    pub fn poll_report_trigger(&mut self, now: Instant) -> bool {
        self.report_trigger.take_expired(now)
    }

    fn close_window(&mut self) -> u64 {
        let discarded = self.suppressed_count;
        self.suppressed = false;
        self.suppressed_count = 0;
        self.stats.windows_closed += 1;
        info!(discarded, "suppress window closed");
        discarded
    }

    pub fn suppress_deadline(&self) -> Option<Instant> {
        self.suppress_window.deadline()
    }

    pub fn report_period(&self) -> Duration {
        self.report_trigger.period()
    }

    pub fn report_deadline(&self) -> Option<Instant> {
        self.report_trigger.deadline()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    pub fn suppressed_count(&self) -> u64 {
        self.suppressed_count
    }

    pub fn stats(&self) -> GateStats {
        self.stats
    }
}
