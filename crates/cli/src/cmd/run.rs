//! Run the daemon in the foreground

use crate::daemon::{self, RunOptions};
use crate::{logging, system_config};
use anyhow::Result;
use std::path::{Path, PathBuf};

pub async fn run(config_path: Option<&Path>, replay: Option<PathBuf>, dry_run: bool) -> Result<()> {
    let config = system_config::load(config_path)?;

    // Held until exit so buffered file logs get flushed
    let _log_guard = logging::init_daemon(&config.storage.log_dir());

    daemon::run(config, RunOptions { replay, dry_run }).await
}
