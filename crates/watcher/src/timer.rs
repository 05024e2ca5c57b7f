//! Re-armable deadline timer
//!
//! A timer here is just an optional monotonic deadline owned by the loop.
//! Re-arming overwrites the deadline, so a stale expiry can never be
//! observed after a reset: there is no fired-but-unconsumed signal to drain.

use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct DeadlineTimer {
    period: Duration,
    deadline: Option<Instant>,
}

impl DeadlineTimer {
    /// Create a disarmed timer with the given period
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            deadline: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Cancel any pending expiry and schedule a new one `period` after `now`
    pub fn rearm(&mut self, now: Instant) {
        self.deadline = Some(now + self.period);
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// True when armed and `now` is at or past the deadline
    pub fn is_expired(&self, now: Instant) -> bool {
        matches!(self.deadline, Some(deadline) if now >= deadline)
    }

    /// Consume the expiry: returns true once per arming, then disarms
    pub fn take_expired(&mut self, now: Instant) -> bool {
        if self.is_expired(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }
}

/// Sleep until `deadline`, or forever when there is none
///
/// Takes the deadline by value so a `select!` branch holds no borrow of the
/// timer while its handler runs.
pub async fn sleep_until_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
