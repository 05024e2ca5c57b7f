//! Stop the background daemon

use crate::{daemon, system_config};
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;
use std::time::Duration;

const STOP_TIMEOUT: Duration = Duration::from_secs(10);

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = system_config::load(config_path)?;

    match daemon::stop(&config, STOP_TIMEOUT).await? {
        Some(pid) => println!("{} Daemon stopped (PID {})", "✓".green(), pid),
        None => println!("{}", "Daemon is not running".yellow()),
    }
    Ok(())
}
