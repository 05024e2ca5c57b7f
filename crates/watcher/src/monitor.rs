//! The single consuming event loop
//!
//! Edge sources push onto one unbounded FIFO channel. The loop multiplexes
//! that channel with the gate's two deadlines and handles exactly one of
//! them per iteration, so gate state and timers are only ever touched here.

use crate::debounce::{DebounceGate, GateStats};
use crate::platform::SourceError;
use crate::timer::sleep_until_deadline;
use seismo_core::{EdgeEvent, EventSink, ReportTrigger, TriggerReason};
use std::future::Future;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// An edge stamped with its monotonic arrival time
#[derive(Debug, Clone)]
pub struct Arrival {
    pub at: Instant,
    pub event: EdgeEvent,
}

pub type EdgeReceiver = mpsc::UnboundedReceiver<Arrival>;

/// Producer half handed to edge sources
///
/// Cloneable and usable from plain threads; delivery never blocks.
#[derive(Debug, Clone)]
pub struct EdgeSender {
    tx: mpsc::UnboundedSender<Arrival>,
}

impl EdgeSender {
    /// Stamp the event with the current instant and enqueue it
    pub fn deliver(&self, event: EdgeEvent) -> Result<(), SourceError> {
        self.deliver_at(event, Instant::now())
    }

    pub fn deliver_at(&self, event: EdgeEvent, at: Instant) -> Result<(), SourceError> {
        self.tx
            .send(Arrival { at, event })
            .map_err(|_| SourceError::Closed)
    }
}

pub fn edge_channel() -> (EdgeSender, EdgeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (EdgeSender { tx }, rx)
}

/// Gate state as last published by the loop
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GateSnapshot {
    pub suppressed: bool,
    pub suppressed_count: u64,
    pub stats: GateStats,
}

impl GateSnapshot {
    fn of<S: EventSink>(gate: &DebounceGate<S>) -> Self {
        Self {
            suppressed: gate.is_suppressed(),
            suppressed_count: gate.suppressed_count(),
            stats: gate.stats(),
        }
    }
}

pub struct Monitor<S, T> {
    gate: DebounceGate<S>,
    trigger: T,
    edges: EdgeReceiver,
    loop_pause: Duration,
    snapshot_tx: watch::Sender<GateSnapshot>,
}

impl<S: EventSink, T: ReportTrigger> Monitor<S, T> {
    pub fn new(gate: DebounceGate<S>, trigger: T, edges: EdgeReceiver) -> Self {
        let (snapshot_tx, _) = watch::channel(GateSnapshot::of(&gate));
        Self {
            gate,
            trigger,
            edges,
            loop_pause: Duration::ZERO,
            snapshot_tx,
        }
    }

    /// Pause after every handled event to bound CPU use
    pub fn with_loop_pause(mut self, pause: Duration) -> Self {
        self.loop_pause = pause;
        self
    }

    /// Observe gate state after each step
    pub fn subscribe(&self) -> watch::Receiver<GateSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Run until `shutdown` completes, returning the lifetime counters
    ///
    /// Requests one report regeneration up front. A closed edge channel does
    /// not end the loop: timers keep running and the process stays up.
    pub async fn run_until<F>(self, shutdown: F) -> GateStats
    where
        F: Future,
    {
        let Monitor {
            mut gate,
            trigger,
            mut edges,
            loop_pause,
            snapshot_tx,
        } = self;

        tokio::pin!(shutdown);

        trigger.regenerate(TriggerReason::Startup);

        let mut source_open = true;

        loop {
            let suppress_at = gate.suppress_deadline();
            let report_at = gate.report_deadline();

            // Queued edges go before timers: each carries its own arrival
            // instant, and the gate closes an elapsed window against it.
            tokio::select! {
                biased;

                _ = &mut shutdown => {
                    info!("Monitor shutting down");
                    break;
                }

                arrival = edges.recv(), if source_open => match arrival {
                    Some(arrival) => {
                        gate.handle_edge(&arrival.event, arrival.at);
                    }
                    None => {
                        warn!("Edge source closed, continuing on timers only");
                        source_open = false;
                    }
                },

                _ = sleep_until_deadline(suppress_at) => {
                    gate.poll_suppress_window(Instant::now());
                }

                _ = sleep_until_deadline(report_at) => {
                    if gate.poll_report_trigger(Instant::now()) {
                        debug!("No edges for {:?}, regenerating report", gate.report_period());
                        trigger.regenerate(TriggerReason::Quiescent);
                    }
                }
            }

            snapshot_tx.send_replace(GateSnapshot::of(&gate));

            if !loop_pause.is_zero() {
                tokio::time::sleep(loop_pause).await;
            }
        }

        gate.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Local;
    use seismo_core::Direction;
    use seismo_journal::MemorySink;
    use std::sync::{Arc, Mutex};
    use tokio::sync::oneshot;

    #[derive(Default)]
    struct RecordingTrigger {
        reasons: Mutex<Vec<TriggerReason>>,
    }

    impl RecordingTrigger {
        fn reasons(&self) -> Vec<TriggerReason> {
            self.reasons.lock().unwrap().clone()
        }
    }

    impl ReportTrigger for RecordingTrigger {
        fn regenerate(&self, reason: TriggerReason) {
            self.reasons.lock().unwrap().push(reason);
        }
    }

    fn edge(direction: Direction, seq: u64) -> EdgeEvent {
        EdgeEvent::new(direction, 17, seq, seq, Local::now(), "0s")
    }

    struct Harness {
        sender: EdgeSender,
        sink: MemorySink,
        trigger: Arc<RecordingTrigger>,
        state: watch::Receiver<GateSnapshot>,
        stop: oneshot::Sender<()>,
        task: tokio::task::JoinHandle<GateStats>,
    }

    fn start(window: Duration, report: Duration, pause: Duration) -> Harness {
        let (sender, edges) = edge_channel();
        let sink = MemorySink::default();
        let trigger = Arc::new(RecordingTrigger::default());
        let gate = DebounceGate::new(sink.clone(), window, report);
        let monitor = Monitor::new(gate, trigger.clone(), edges).with_loop_pause(pause);
        let state = monitor.subscribe();
        let (stop, stopped) = oneshot::channel::<()>();
        let task = tokio::spawn(monitor.run_until(stopped));

        Harness {
            sender,
            sink,
            trigger,
            state,
            stop,
            task,
        }
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_rising_falling_rising_within_window() {
        let h = start(Duration::from_secs(2), Duration::from_secs(30), Duration::ZERO);
        let t0 = Instant::now();

        h.sender.deliver(edge(Direction::Rising, 1)).unwrap();
        tokio::time::sleep_until(t0 + Duration::from_millis(100)).await;
        h.sender.deliver(edge(Direction::Falling, 2)).unwrap();
        tokio::time::sleep_until(t0 + Duration::from_millis(500)).await;
        h.sender.deliver(edge(Direction::Rising, 3)).unwrap();
        settle().await;

        assert_eq!(h.sink.lines().len(), 1);
        assert!(h.sink.lines()[0].contains("rising  17 event: #1(1)"));
        let snap = *h.state.borrow();
        assert!(snap.suppressed);
        assert_eq!(snap.suppressed_count, 2);

        tokio::time::sleep_until(t0 + Duration::from_secs(2)).await;
        settle().await;

        let snap = *h.state.borrow();
        assert!(!snap.suppressed);
        assert_eq!(snap.suppressed_count, 0);
        assert_eq!(snap.stats.windows_closed, 1);
        assert_eq!(h.sink.lines().len(), 1);

        h.stop.send(()).unwrap();
        let stats = h.task.await.unwrap();
        assert_eq!(stats.admitted, 1);
        assert_eq!(stats.suppressed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_startup_and_quiescent_regeneration() {
        let h = start(Duration::from_secs(2), Duration::from_secs(30), Duration::ZERO);
        let t0 = Instant::now();

        settle().await;
        assert_eq!(h.trigger.reasons(), vec![TriggerReason::Startup]);

        h.sender.deliver(edge(Direction::Rising, 1)).unwrap();
        tokio::time::sleep_until(t0 + Duration::from_secs(10)).await;
        h.sender.deliver(edge(Direction::Falling, 2)).unwrap();

        // 30s after the first edge: the second edge pushed the trigger back
        tokio::time::sleep_until(t0 + Duration::from_secs(31)).await;
        assert_eq!(h.trigger.reasons(), vec![TriggerReason::Startup]);

        tokio::time::sleep_until(t0 + Duration::from_secs(41)).await;
        assert_eq!(
            h.trigger.reasons(),
            vec![TriggerReason::Startup, TriggerReason::Quiescent]
        );

        // Fires once per quiet period
        tokio::time::sleep_until(t0 + Duration::from_secs(120)).await;
        assert_eq!(h.trigger.reasons().len(), 2);

        h.stop.send(()).unwrap();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_report_expiry_does_not_touch_gate() {
        let h = start(Duration::from_secs(10), Duration::from_secs(3), Duration::ZERO);
        let t0 = Instant::now();

        h.sender.deliver(edge(Direction::Rising, 1)).unwrap();
        settle().await;
        h.sender.deliver(edge(Direction::Falling, 2)).unwrap();
        tokio::time::sleep_until(t0 + Duration::from_secs(5)).await;

        assert_eq!(h.trigger.reasons().last(), Some(&TriggerReason::Quiescent));
        let snap = *h.state.borrow();
        assert!(snap.suppressed);
        assert_eq!(snap.suppressed_count, 1);

        h.stop.send(()).unwrap();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_loop_pause_does_not_admit_late_processed_noise() {
        // Edges queue up during the pause but keep their arrival instants
        let h = start(Duration::from_secs(2), Duration::from_secs(30), Duration::from_secs(3));
        let t0 = Instant::now();

        h.sender.deliver(edge(Direction::Rising, 1)).unwrap();
        tokio::time::sleep_until(t0 + Duration::from_millis(1900)).await;
        h.sender.deliver(edge(Direction::Falling, 2)).unwrap();
        tokio::time::sleep_until(t0 + Duration::from_secs(7)).await;

        assert_eq!(h.sink.lines().len(), 1);
        let snap = *h.state.borrow();
        assert_eq!(snap.stats.suppressed, 1);
        assert!(!snap.suppressed);

        h.stop.send(()).unwrap();
        h.task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_source_keeps_loop_alive() {
        let h = start(Duration::from_secs(2), Duration::from_secs(30), Duration::ZERO);

        h.sender.deliver(edge(Direction::Rising, 1)).unwrap();
        drop(h.sender);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!h.task.is_finished());
        assert_eq!(
            h.trigger.reasons(),
            vec![TriggerReason::Startup, TriggerReason::Quiescent]
        );

        h.stop.send(()).unwrap();
        let stats = h.task.await.unwrap();
        assert_eq!(stats.admitted, 1);
    }
}
