//! Tracing subscriber setup
//!
//! Filter comes from `SEISMO_LOG` (e.g. `SEISMO_LOG=seismo_watcher=debug`),
//! defaulting to `info` for the daemon and `warn` for one-shot commands.

use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

const FILTER_ENV: &str = "SEISMO_LOG";

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Console-only logging for short-lived commands
pub fn init_console() {
    let _ = tracing_subscriber::registry()
        .with(filter("warn"))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}

/// Console plus daily-rolling file logging for the daemon
///
/// The returned guard flushes the file writer on drop and must be held for
/// the life of the process. Without a usable log directory only the console
/// layer is installed.
pub fn init_daemon(log_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(log_dir) {
        let _ = tracing_subscriber::registry()
            .with(filter("info"))
            .with(tracing_subscriber::fmt::layer())
            .try_init();
        tracing::error!("Failed to create log directory {}: {}", log_dir.display(), e);
        return None;
    }

    let appender = tracing_appender::rolling::daily(log_dir, "daemon.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let _ = tracing_subscriber::registry()
        .with(filter("info"))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false),
        )
        .try_init();

    Some(guard)
}
