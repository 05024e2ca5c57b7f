//! Daemon lifecycle management
//!
//! One daemon per data directory, guarded by the lock in `<data_dir>/locks`.
//! Startup failures of the edge source or the event log do not stop the
//! daemon; it keeps running on its timers so the report stays fresh.

use crate::locks::{self, DaemonLock, LockContent};
use anyhow::{Context, Result};
use seismo_core::{Config, EventSink, SensorConfig};
use seismo_journal::{FileSink, MemorySink, ReportGenerator};
use seismo_watcher::platform::replay;
use seismo_watcher::{
    edge_channel, spawn_gpio_source, CalendarSchedule, DebounceGate, EdgeSender, Monitor, ReportScheduler,
    SourceError,
};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// How the foreground daemon gets its edges and where admitted events go
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Replay file instead of the GPIO chip; `-` reads stdin
    pub replay: Option<PathBuf>,
    /// Keep admitted events in memory instead of the event log
    pub dry_run: bool,
}

/// Run until SIGINT or SIGTERM
pub async fn run(config: Config, options: RunOptions) -> Result<()> {
    run_until(config, options, shutdown_signal()).await
}

/// Run until `shutdown` completes
pub async fn run_until<F: Future>(config: Config, options: RunOptions, shutdown: F) -> Result<()> {
    let storage = &config.storage;
    std::fs::create_dir_all(&storage.data_dir)
        .with_context(|| format!("Failed to create data directory {}", storage.data_dir.display()))?;

    let lock = DaemonLock::acquire(&storage.lock_dir())?;
    info!(pid = std::process::id(), "Seismo daemon starting");

    let generator = ReportGenerator::new(storage.event_log_path(), storage.report_path(), Handle::current());

    // The daemon keeps no sender of its own, so a dead source closes the channel
    let (sender, edges) = edge_channel();
    start_source(&config.sensor, options.replay, sender);

    let sink: Box<dyn EventSink> = if options.dry_run {
        info!("Dry run: admitted events are not written to the event log");
        Box::new(MemorySink::default())
    } else {
        Box::new(FileSink::open_or_degraded(&storage.event_log_path()))
    };

    let gate = DebounceGate::from_config(sink, &config.debounce);
    let monitor =
        Monitor::new(gate, generator.clone(), edges).with_loop_pause(config.debounce.loop_pause());

    let scheduler = match CalendarSchedule::from_config(&config.schedule) {
        Some(schedule) => Some(tokio::spawn(ReportScheduler::new(schedule, generator.clone()).run())),
        None => {
            info!("Scheduled report regeneration disabled");
            None
        }
    };

    let stats = monitor.run_until(shutdown).await;

    if let Some(task) = scheduler {
        task.abort();
    }

    info!(
        admitted = stats.admitted,
        suppressed = stats.suppressed,
        sink_failures = stats.sink_failures,
        "Seismo daemon stopped"
    );

    lock.release()?;
    Ok(())
}

fn start_source(sensor: &SensorConfig, replay_from: Option<PathBuf>, sender: EdgeSender) {
    match replay_from {
        Some(path) if path.as_os_str() == "-" => {
            info!("Replaying edges from stdin");
            log_replay_failure(replay::spawn_stdin(sender));
        }
        Some(path) => {
            info!("Replaying edges from {}", path.display());
            log_replay_failure(replay::spawn_file(path, sender));
        }
        None => match spawn_gpio_source(sensor, sender) {
            Ok(source) => info!(lines = ?source.lines, "Watching {} for edges", sensor.chip),
            Err(e) => error!("Edge source failed, running on timers only: {}", e),
        },
    }
}

fn log_replay_failure(task: JoinHandle<Result<u64, SourceError>>) {
    tokio::spawn(async move {
        match task.await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => error!("Replay stopped: {}", e),
            Err(e) => error!("Replay task failed: {}", e),
        }
    });
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("Received SIGINT"),
                    _ = terminate.recv() => info!("Received SIGTERM"),
                }
                return;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to wait for interrupt: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received interrupt");
}

/// The running daemon for this configuration, if any
pub fn running(config: &Config) -> Option<LockContent> {
    locks::holder(&config.storage.lock_dir())
}

/// Ask the running daemon to exit and wait for it to release its lock
pub async fn stop(config: &Config, timeout: Duration) -> Result<Option<u32>> {
    let Some(holder) = running(config) else {
        return Ok(None);
    };

    send_terminate(holder.pid)?;

    let deadline = tokio::time::Instant::now() + timeout;
    while running(config).is_some() {
        if tokio::time::Instant::now() >= deadline {
            anyhow::bail!("Daemon (PID {}) did not exit within {:?}", holder.pid, timeout);
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Ok(Some(holder.pid))
}

#[cfg(unix)]
fn send_terminate(pid: u32) -> Result<()> {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;

    kill(Pid::from_raw(pid as i32), Signal::SIGTERM)
        .with_context(|| format!("Failed to signal daemon (PID {})", pid))
}

#[cfg(not(unix))]
fn send_terminate(pid: u32) -> Result<()> {
    anyhow::bail!("Stopping the daemon (PID {}) is only supported on Unix", pid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(data_dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = data_dir.to_path_buf();
        config.schedule.enabled = false;
        config
    }

    #[tokio::test]
    async fn test_replay_run_writes_debounced_log() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir.path().join("data"));
        let replay_path = temp_dir.path().join("edges.txt");
        // Five edges in quick succession collapse to one
        std::fs::write(&replay_path, "rising 17\nfalling 17\nrising 27\nfalling 27\nrising 17\n").unwrap();

        let options = RunOptions {
            replay: Some(replay_path),
            dry_run: false,
        };
        run_until(config.clone(), options, tokio::time::sleep(Duration::from_millis(300)))
            .await
            .unwrap();

        let log = std::fs::read_to_string(config.storage.event_log_path()).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 1);
        assert!(lines[0][20..].starts_with("rising  17 event: #1(1)"));

        // Lock released on the way out
        assert!(running(&config).is_none());
        assert!(!config.storage.lock_dir().join("daemon.lock").exists());
    }

    #[tokio::test]
    async fn test_dry_run_leaves_log_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let replay_path = temp_dir.path().join("edges.txt");
        std::fs::write(&replay_path, "rising 17\n").unwrap();

        let options = RunOptions {
            replay: Some(replay_path),
            dry_run: true,
        };
        run_until(config.clone(), options, tokio::time::sleep(Duration::from_millis(200)))
            .await
            .unwrap();

        assert!(!config.storage.event_log_path().exists());
    }

    #[tokio::test]
    async fn test_second_daemon_refused() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());

        let _held = DaemonLock::acquire(&config.storage.lock_dir()).unwrap();
        let result = run_until(config, RunOptions::default(), async {}).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_stop_without_daemon() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        assert_eq!(stop(&config, Duration::from_secs(1)).await.unwrap(), None);
    }
}
