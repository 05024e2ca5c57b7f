//! Start the daemon in the background

use crate::{daemon, system_config};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;
use std::process::Command;
use std::time::Duration;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = system_config::load(config_path)?;

    if let Some(holder) = daemon::running(&config) {
        println!("{} (PID {})", "Daemon already running".yellow(), holder.pid);
        return Ok(());
    }

    let log_dir = config.storage.log_dir();
    std::fs::create_dir_all(&log_dir).context("Failed to create logs directory")?;
    let console_log = log_dir.join("console.log");

    let exe = std::env::current_exe().context("Failed to get current executable path")?;

    // Anything printed before tracing is up (or on a panic) lands here
    let console = std::fs::File::create(&console_log).context("Failed to create console log")?;

    let mut command = Command::new("nohup");
    command.arg(&exe);
    if let Some(path) = config_path {
        command.arg("--config").arg(path);
    }
    command
        .arg("run")
        .stdout(console.try_clone()?)
        .stderr(console)
        .spawn()
        .context("Failed to spawn daemon process")?;

    // Wait a moment to verify it started
    tokio::time::sleep(Duration::from_millis(500)).await;

    match daemon::running(&config) {
        Some(holder) => {
            println!("{} Daemon started (PID {})", "✓".green(), holder.pid);
            println!("Logs: {}", log_dir.display());
            Ok(())
        }
        None => anyhow::bail!("Daemon failed to start (check logs at {})", console_log.display()),
    }
}
