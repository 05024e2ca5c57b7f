//! GPIO character-device edge source
//!
//! Each configured line gets its own request and blocking reader thread, so
//! one unavailable line does not take the others down.

use super::{GpioSource, SourceError};
use crate::monitor::EdgeSender;
use chrono::Local;
use gpiocdev::line::{Bias, EdgeDetection, EdgeKind};
use gpiocdev::Request;
use seismo_core::{Direction, EdgeEvent, LineId, SensorConfig};
use std::time::Duration;
use tracing::{error, info, warn};

const CONSUMER: &str = "seismo";

pub(super) fn spawn(config: &SensorConfig, sender: EdgeSender) -> Result<GpioSource, SourceError> {
    let mut lines = Vec::new();
    let mut readers = Vec::new();

    for &line in &config.lines {
        let request = match request_line(config, line) {
            Ok(request) => request,
            Err(e) => {
                error!("{}", e);
                continue;
            }
        };

        let sender = sender.clone();
        let reader = std::thread::Builder::new()
            .name(format!("seismo-gpio-{}", line))
            .spawn(move || read_edges(request, line, sender))?;

        info!(
            line,
            debounce_ms = config.hardware_debounce_ms,
            pull_up = config.pull_up,
            "Watching {} line {}",
            config.chip,
            line
        );
        lines.push(line);
        readers.push(reader);
    }

    if lines.is_empty() {
        return Err(SourceError::NoLines {
            chip: config.chip.clone(),
        });
    }

    Ok(GpioSource { lines, readers })
}

fn request_line(config: &SensorConfig, line: LineId) -> Result<Request, SourceError> {
    let mut builder = Request::builder();
    builder
        .on_chip(&config.chip)
        .with_consumer(CONSUMER)
        .with_line(line)
        .with_edge_detection(EdgeDetection::BothEdges)
        .with_debounce_period(config.hardware_debounce());
    if config.pull_up {
        builder.with_bias(Bias::PullUp);
    }

    builder.request().map_err(|e| {
        let mut message = e.to_string();
        // EINVAL here almost always means an old kernel rejecting the bias flag
        if config.pull_up && message.contains("Invalid argument") {
            message.push_str(" (pull-up bias requires Linux 5.5 or later, check the kernel version)");
        }
        SourceError::Request {
            chip: config.chip.clone(),
            line,
            message,
        }
    })
}

fn read_edges(request: Request, line: LineId, sender: EdgeSender) {
    loop {
        let edge = match request.read_edge_event() {
            Ok(edge) => edge,
            Err(e) => {
                error!(line, error = %e, "GPIO read failed, stopping reader");
                return;
            }
        };

        let direction = match edge.kind {
            EdgeKind::Rising => Direction::Rising,
            EdgeKind::Falling => Direction::Falling,
        };
        let event = EdgeEvent::new(
            direction,
            edge.offset,
            u64::from(edge.seqno),
            u64::from(edge.line_seqno),
            Local::now(),
            format!("{:?}", Duration::from_nanos(edge.timestamp_ns)),
        );

        if sender.deliver(event).is_err() {
            warn!(line, "Edge loop gone, stopping reader");
            return;
        }
    }
}
