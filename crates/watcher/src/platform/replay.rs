//! Text replay edge source
//!
//! One directive per line:
//!
//! ```text
//! rising 17            # edge on line 17
//! falling 17 812.5ms   # optional hardware timestamp, kept verbatim
//! sleep 250            # wait 250 ms before the next directive
//! ```
//!
//! Blank lines and `#` comments are skipped. Malformed lines are logged and
//! skipped rather than ending the replay.

use super::{SequenceCounter, SourceError};
use crate::monitor::EdgeSender;
use chrono::Local;
use seismo_core::{Direction, EdgeEvent, LineId};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{info, warn};

/// A parsed replay directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Edge {
        direction: Direction,
        line: LineId,
        hardware_timestamp: Option<String>,
    },
    Sleep(Duration),
}

/// Parse one replay line; `Ok(None)` for blanks and comments
pub fn parse_directive(text: &str, line_no: usize) -> Result<Option<Directive>, SourceError> {
    let text = match text.split_once('#') {
        Some((before, _)) => before,
        None => text,
    };
    let mut fields = text.split_whitespace();

    let Some(head) = fields.next() else {
        return Ok(None);
    };

    let parse_err = |message: String| SourceError::Parse { line_no, message };

    if head.eq_ignore_ascii_case("sleep") {
        let ms = fields
            .next()
            .ok_or_else(|| parse_err("sleep needs a duration in milliseconds".to_string()))?
            .parse::<u64>()
            .map_err(|e| parse_err(format!("bad sleep duration: {}", e)))?;
        return Ok(Some(Directive::Sleep(Duration::from_millis(ms))));
    }

    let direction = head.parse::<Direction>().map_err(parse_err)?;
    let line = fields
        .next()
        .ok_or_else(|| parse_err("missing line number".to_string()))?
        .parse::<LineId>()
        .map_err(|e| parse_err(format!("bad line number: {}", e)))?;
    let rest: Vec<&str> = fields.collect();
    let hardware_timestamp = (!rest.is_empty()).then(|| rest.join(" "));

    Ok(Some(Directive::Edge {
        direction,
        line,
        hardware_timestamp,
    }))
}

/// Deliver every edge in `reader`, returning how many were delivered
///
/// Stops early only when the edge loop has gone away.
pub async fn replay<R>(reader: R, sender: EdgeSender) -> Result<u64, SourceError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut counter = SequenceCounter::default();
    let mut delivered = 0u64;
    let mut line_no = 0usize;

    while let Some(text) = lines.next_line().await? {
        line_no += 1;

        let directive = match parse_directive(&text, line_no) {
            Ok(Some(directive)) => directive,
            Ok(None) => continue,
            Err(e) => {
                warn!("{}", e);
                continue;
            }
        };

        match directive {
            Directive::Sleep(duration) => tokio::time::sleep(duration).await,
            Directive::Edge {
                direction,
                line,
                hardware_timestamp,
            } => {
                let (global_seq, line_seq) = counter.next(line);
                let event = EdgeEvent::new(
                    direction,
                    line,
                    global_seq,
                    line_seq,
                    Local::now(),
                    hardware_timestamp.unwrap_or_else(|| "replay".to_string()),
                );
                sender.deliver(event)?;
                delivered += 1;
            }
        }
    }

    info!(delivered, "Replay finished");
    Ok(delivered)
}

/// Replay from standard input on a background task
pub fn spawn_stdin(sender: EdgeSender) -> tokio::task::JoinHandle<Result<u64, SourceError>> {
    tokio::spawn(async move {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        replay(stdin, sender).await
    })
}

/// Replay from a file on a background task
pub fn spawn_file(
    path: std::path::PathBuf,
    sender: EdgeSender,
) -> tokio::task::JoinHandle<Result<u64, SourceError>> {
    tokio::spawn(async move {
        let file = tokio::fs::File::open(&path).await?;
        replay(tokio::io::BufReader::new(file), sender).await
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::edge_channel;

    #[test]
    fn test_parse_edge_directives() {
        assert_eq!(
            parse_directive("rising 17", 1).unwrap(),
            Some(Directive::Edge {
                direction: Direction::Rising,
                line: 17,
                hardware_timestamp: None,
            })
        );
        assert_eq!(
            parse_directive("  falling 27 812.5ms  # ringing", 2).unwrap(),
            Some(Directive::Edge {
                direction: Direction::Falling,
                line: 27,
                hardware_timestamp: Some("812.5ms".to_string()),
            })
        );
    }

    #[test]
    fn test_parse_sleep_and_blank() {
        assert_eq!(
            parse_directive("sleep 250", 1).unwrap(),
            Some(Directive::Sleep(Duration::from_millis(250)))
        );
        assert_eq!(parse_directive("", 2).unwrap(), None);
        assert_eq!(parse_directive("   # only a comment", 3).unwrap(), None);
    }

    #[test]
    fn test_parse_errors_carry_line_number() {
        match parse_directive("wobble 17", 9).unwrap_err() {
            SourceError::Parse { line_no, .. } => assert_eq!(line_no, 9),
            other => panic!("unexpected error: {other}"),
        }
        assert!(parse_directive("rising", 1).is_err());
        assert!(parse_directive("rising x", 1).is_err());
        assert!(parse_directive("sleep soon", 1).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_delivers_in_order_with_sequence_numbers() {
        let script = "rising 17\nbogus\nsleep 100\nfalling 17 hw-1\nrising 27\n";
        let (sender, mut edges) = edge_channel();

        let delivered = replay(script.as_bytes(), sender).await.unwrap();
        assert_eq!(delivered, 3);

        let first = edges.recv().await.unwrap();
        let second = edges.recv().await.unwrap();
        let third = edges.recv().await.unwrap();

        assert_eq!(first.event.pairing_id(), "rising17");
        assert_eq!(second.event.pairing_id(), "falling17");
        assert_eq!(second.event.hardware_timestamp(), "hw-1");
        assert_eq!((second.event.global_seq(), second.event.line_seq()), (2, 2));
        assert_eq!((third.event.global_seq(), third.event.line_seq()), (3, 1));
        assert!(second.at - first.at >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_replay_stops_when_loop_is_gone() {
        let (sender, edges) = edge_channel();
        drop(edges);

        let err = replay("rising 17\n".as_bytes(), sender).await.unwrap_err();
        assert!(matches!(err, SourceError::Closed));
    }
}
