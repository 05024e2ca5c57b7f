//! Configuration file location and persistence
//!
//! Resolution order: `--config`, then `$SEISMO_CONFIG`, then
//! `<user config dir>/seismo/config.toml`.

use anyhow::{Context, Result};
use seismo_core::Config;
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "SEISMO_CONFIG";

/// Resolve the config file path
pub fn config_file_path(override_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = override_path {
        return Ok(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    let base = dirs::config_dir().context("Could not determine user config directory")?;
    Ok(base.join("seismo").join("config.toml"))
}

/// Load the configuration; a missing file yields defaults
pub fn load(override_path: Option<&Path>) -> Result<Config> {
    let path = config_file_path(override_path)?;
    Config::load(&path).with_context(|| format!("Failed to load config from {}", path.display()))
}

/// Validate and write the configuration
pub fn save(override_path: Option<&Path>, config: &Config) -> Result<PathBuf> {
    config.validate().context("Invalid configuration")?;

    let path = config_file_path(override_path)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let contents = config.to_toml()?;
    std::fs::write(&path, contents).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}

/// Write the example config if no file exists yet
///
/// Returns true when a file was created.
pub fn init_if_missing(override_path: Option<&Path>) -> Result<bool> {
    let path = config_file_path(override_path)?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    std::fs::write(&path, example_config()).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(true)
}

/// Commented configuration with every default spelled out
pub fn example_config() -> &'static str {
    r#"# Seismo configuration

[sensor]
# GPIO character device
chip = "/dev/gpiochip0"
# Line offsets watched for both edges
lines = [17, 27]
# Kernel debounce per line (0 disables)
hardware_debounce_ms = 375
pull_up = true

[debounce]
# Edges within this window of an admitted edge are discarded
suppress_window_ms = 2000
# Quiet period after the last edge before the report is regenerated
report_trigger_secs = 30
# Pause after each monitor loop iteration (0 disables)
loop_pause_ms = 0

[storage]
data_dir = "/var/lib/seismo"
event_log = "vibration.txt"
report_file = "index.html"

[schedule]
# Regenerate the report at these local times every day
enabled = true
hours = [6, 8, 10, 12, 14, 16, 18, 20, 22]
minute = 0
second = 2
"#
}
