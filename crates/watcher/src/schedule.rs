//! Calendar-driven report regeneration
//!
//! Fires the report trigger at fixed local times of day (by default a few
//! seconds past every other hour from 06:00 to 22:00), independent of edge
//! activity. Runs as its own task: it only touches the trigger, never the
//! debounce gate.

use chrono::{DateTime, Days, Local, NaiveTime, TimeZone};
use seismo_core::{ReportTrigger, ScheduleConfig, TriggerReason};
use std::collections::BTreeSet;
use std::time::Duration;
use tracing::{debug, info};

/// Set of daily firing times
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarSchedule {
    times: BTreeSet<NaiveTime>,
}

impl CalendarSchedule {
    /// Build from configuration; `None` when disabled or without hours
    pub fn from_config(config: &ScheduleConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }

        let times: BTreeSet<NaiveTime> = config
            .hours
            .iter()
            .filter_map(|&hour| NaiveTime::from_hms_opt(hour, config.minute, config.second))
            .collect();

        if times.is_empty() {
            None
        } else {
            Some(Self { times })
        }
    }

    /// First firing time strictly after `now`
    ///
    /// Local times that do not exist (DST gaps) are skipped.
    pub fn next_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Option<DateTime<Tz>> {
        let tz = now.timezone();
        let today = now.date_naive();

        // Two days always suffice except across a gap that swallows every slot
        (0..3u64)
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .flat_map(|day| self.times.iter().map(move |&time| day.and_time(time)))
            .filter_map(|naive| tz.from_local_datetime(&naive).earliest())
            .find(|candidate| candidate > now)
    }
}

/// Background task firing the trigger on a calendar schedule
pub struct ReportScheduler<T> {
    schedule: CalendarSchedule,
    trigger: T,
}

impl<T: ReportTrigger> ReportScheduler<T> {
    pub fn new(schedule: CalendarSchedule, trigger: T) -> Self {
        Self { schedule, trigger }
    }

    /// Run indefinitely
    pub async fn run(self) {
        info!("Starting report schedule ({} times per day)", self.schedule.times.len());

        let mut last_fired: Option<DateTime<Local>> = None;

        loop {
            let now = Local::now();
            // Never pick the slot we just fired, even if the wall clock lags
            let reference = match last_fired {
                Some(fired) if fired > now => fired,
                _ => now,
            };

            let Some(next) = self.schedule.next_after(&reference) else {
                info!("Report schedule has no future firing time, stopping");
                return;
            };

            let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
            debug!("Next scheduled report at {} (in {:?})", next, wait);
            tokio::time::sleep(wait).await;

            self.trigger.regenerate(TriggerReason::Scheduled);
            last_fired = Some(next);
        }
    }
}
