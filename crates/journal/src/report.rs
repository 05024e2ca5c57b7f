//! Report regeneration from the event log
//!
//! The report is an HTML table of every logged event with a per-day count,
//! rewritten in full on each regeneration. Writes go through a temp file in
//! the same directory and a rename, so readers never see a partial report.

use crate::record::LogRecord;
use chrono::{DateTime, Local};
use seismo_core::{ReportTrigger, TriggerReason};
use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::runtime::Handle;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("failed to read event log {path}: {source}")]
    ReadLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// What went into a rendered report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportSummary {
    pub events: usize,
    pub days: usize,
    /// Lines that could not be parsed
    pub skipped: usize,
}

/// Render the report for the given event-log contents
pub fn render_report(log: &str, note: &str, generated_at: DateTime<Local>) -> (String, ReportSummary) {
    let mut summary = ReportSummary::default();
    let mut days: Vec<(String, Vec<LogRecord>)> = Vec::new();

    for (index, line) in log.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match LogRecord::parse(line) {
            Ok(record) => {
                let date = record.date();
                match days.last_mut() {
                    Some((day, records)) if *day == date => records.push(record),
                    _ => days.push((date, vec![record])),
                }
                summary.events += 1;
            }
            Err(e) => {
                warn!("Skipping event log line {}: {}", index + 1, e);
                summary.skipped += 1;
            }
        }
    }
    summary.days = days.len();

    let heading = format!(
        "Vsn: {} at {}",
        env!("CARGO_PKG_VERSION"),
        generated_at.format("%Y-%m-%d %H:%M:%S")
    );

    let mut html = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(html, "<!-- seismo report ({}): {} -->", escape(note), heading);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    let _ = writeln!(html, "<title>Vibrations Detected {}</title>", heading);
    html.push_str(concat!(
        "<style>\n",
        " td {\n  text-align: left;\n }\n",
        " table, th, td {\n  border: 1px solid;\n  border-spacing: 5px;\n  border-collapse: collapse;\n }\n",
        "</style>\n</head>\n<body>\n"
    ));
    let _ = writeln!(html, "<h2>Vibrations Detected {}</h2>", heading);
    html.push_str("<table width=\"920\">\n");
    html.push_str("<tr><th>Time</th><th>Event</th><th>Description</th><th>Count</th></tr>\n");

    for (_, records) in &days {
        let last = records.len() - 1;
        for (i, record) in records.iter().enumerate() {
            // The day's total sits on its last row
            let count = if i == last { records.len().to_string() } else { String::new() };
            let _ = writeln!(
                html,
                "    <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                record.time(),
                escape(&record.event),
                escape(record.details.as_deref().unwrap_or(" ? ")),
                count
            );
        }
    }

    html.push_str("</table>\n</body>\n</html>\n");
    (html, summary)
}

/// Regenerate `report_path` from `log_path`
///
/// A missing event log yields an empty report. Bytes that are not UTF-8 are
/// replaced, so a damaged line is counted as skipped rather than failing every
/// later regeneration.
pub fn write_report(log_path: &Path, report_path: &Path, note: &str) -> Result<ReportSummary, ReportError> {
    let bytes = match std::fs::read(log_path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
        Err(source) => {
            return Err(ReportError::ReadLog {
                path: log_path.to_path_buf(),
                source,
            })
        }
    };

    let log = String::from_utf8_lossy(&bytes);
    let (html, summary) = render_report(&log, note, Local::now());

    let write_err = |source: std::io::Error| ReportError::Write {
        path: report_path.to_path_buf(),
        source,
    };
    let dir = match report_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(html.as_bytes()).map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(report_path).map_err(|e| write_err(e.error))?;

    Ok(summary)
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Claim on the single regeneration slot, released on drop
///
/// Dropping also runs during unwinding, so a panicking regeneration cannot
/// leave the slot taken.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn claim(flag: &Arc<AtomicBool>) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(Self(Arc::clone(flag)))
        }
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Report trigger that regenerates on the blocking thread pool
///
/// At most one regeneration runs at a time; requests arriving meanwhile are
/// dropped, since the running one already covers them.
#[derive(Clone)]
pub struct ReportGenerator {
    log_path: PathBuf,
    report_path: PathBuf,
    in_flight: Arc<AtomicBool>,
    runtime: Handle,
}

impl ReportGenerator {
    pub fn new(log_path: PathBuf, report_path: PathBuf, runtime: Handle) -> Self {
        Self {
            log_path,
            report_path,
            in_flight: Arc::new(AtomicBool::new(false)),
            runtime,
        }
    }

    pub fn report_path(&self) -> &Path {
        &self.report_path
    }

    /// Regenerate synchronously on the calling thread
    pub fn generate_now(&self, reason: TriggerReason) -> Result<ReportSummary, ReportError> {
        run_logged(&self.log_path, &self.report_path, reason)
    }
}

impl ReportTrigger for ReportGenerator {
    fn regenerate(&self, reason: TriggerReason) {
        let Some(claim) = InFlight::claim(&self.in_flight) else {
            info!("Report regeneration already running, skipping ({})", reason);
            return;
        };

        let log_path = self.log_path.clone();
        let report_path = self.report_path.clone();

        self.runtime.spawn_blocking(move || {
            let _claim = claim;
            // Failures are logged inside; nothing waits on the result
            let _ = run_logged(&log_path, &report_path, reason);
        });
    }
}

fn run_logged(log_path: &Path, report_path: &Path, reason: TriggerReason) -> Result<ReportSummary, ReportError> {
    let started = Instant::now();
    match write_report(log_path, report_path, &reason.to_string()) {
        Ok(summary) => {
            info!(
                events = summary.events,
                days = summary.days,
                skipped = summary.skipped,
                "Report regenerated ({}) in {:?}: {}",
                reason,
                started.elapsed(),
                report_path.display()
            );
            Ok(summary)
        }
        Err(e) => {
            error!("Report regeneration ({}) failed: {}", reason, e);
            Err(e)
        }
    }
}
