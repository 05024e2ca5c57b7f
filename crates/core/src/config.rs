//! Configuration schema
//!
//! Every section defaults independently, so a partial TOML file (or none at
//! all) yields a usable configuration.

use crate::edge::LineId;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Largest GPIO line offset the event log can lay out
pub const MAX_LINE_OFFSET: u64 = 999;

/// Full seismo configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sensor: SensorConfig,
    pub debounce: DebounceConfig,
    pub storage: StorageConfig,
    pub schedule: ScheduleConfig,
}

/// Sensor lines and hardware-level filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// GPIO character device
    pub chip: String,
    /// Line offsets to watch, at most three digits each
    pub lines: Vec<LineId>,
    /// Debounce period applied by the kernel before edges reach us
    pub hardware_debounce_ms: u64,
    /// Enable the internal pull-up bias (kernel 5.5+)
    pub pull_up: bool,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            chip: "/dev/gpiochip0".to_string(),
            lines: vec![17, 27],
            // 75, 150 and 250 ms still let contact ringing through
            hardware_debounce_ms: 375,
            pull_up: true,
        }
    }
}

impl SensorConfig {
    pub fn hardware_debounce(&self) -> Duration {
        Duration::from_millis(self.hardware_debounce_ms)
    }
}

/// Debounce gate timing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Longest plausible ring after a genuine event
    pub suppress_window_ms: u64,
    /// Quiet period before the report is regenerated
    pub report_trigger_secs: u64,
    /// Pause after each loop iteration (0 disables)
    pub loop_pause_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            suppress_window_ms: 2_000,
            report_trigger_secs: 30,
            loop_pause_ms: 0,
        }
    }
}

impl DebounceConfig {
    pub fn suppress_window(&self) -> Duration {
        Duration::from_millis(self.suppress_window_ms)
    }

    pub fn report_trigger(&self) -> Duration {
        Duration::from_secs(self.report_trigger_secs)
    }

    pub fn loop_pause(&self) -> Duration {
        Duration::from_millis(self.loop_pause_ms)
    }
}

/// Where the event log and report live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub event_log: String,
    pub report_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("/var/lib/seismo"),
            event_log: "vibration.txt".to_string(),
            report_file: "index.html".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn event_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.event_log)
    }

    pub fn report_path(&self) -> PathBuf {
        self.data_dir.join(&self.report_file)
    }

    pub fn lock_dir(&self) -> PathBuf {
        self.data_dir.join("locks")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Calendar schedule for report regeneration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Local hours of the day (0-23)
    pub hours: Vec<u32>,
    pub minute: u32,
    pub second: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            hours: vec![6, 8, 10, 12, 14, 16, 18, 20, 22],
            minute: 0,
            second: 2,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file; a missing file yields defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse and validate configuration text
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.debounce;
        check_range("debounce.suppress_window_ms", d.suppress_window_ms, 1, 60_000)?;
        check_range("debounce.report_trigger_secs", d.report_trigger_secs, 1, 86_400)?;
        check_range("debounce.loop_pause_ms", d.loop_pause_ms, 0, 5_000)?;
        if d.report_trigger() <= d.suppress_window() {
            return Err(ConfigError::Invalid(format!(
                "debounce.report_trigger_secs ({}s) must be longer than debounce.suppress_window_ms ({}ms)",
                d.report_trigger_secs, d.suppress_window_ms
            )));
        }

        let s = &self.sensor;
        check_range("sensor.hardware_debounce_ms", s.hardware_debounce_ms, 0, 10_000)?;
        check_range("sensor.lines (count)", s.lines.len() as u64, 1, 64)?;
        // The log line's direction/line column is ten characters wide
        for &line in &s.lines {
            check_range("sensor.lines", u64::from(line), 0, MAX_LINE_OFFSET)?;
        }
        if s.chip.is_empty() {
            return Err(ConfigError::Invalid("sensor.chip must not be empty".to_string()));
        }

        let st = &self.storage;
        if st.event_log.is_empty() || st.report_file.is_empty() {
            return Err(ConfigError::Invalid(
                "storage.event_log and storage.report_file must not be empty".to_string(),
            ));
        }

        let sc = &self.schedule;
        for &hour in &sc.hours {
            check_range("schedule.hours", u64::from(hour), 0, 23)?;
        }
        check_range("schedule.minute", u64::from(sc.minute), 0, 59)?;
        check_range("schedule.second", u64::from(sc.second), 0, 59)?;

        Ok(())
    }
}

fn check_range(key: &'static str, value: u64, min: u64, max: u64) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::OutOfRange {
            key,
            value: value.to_string(),
            expected: format!("{}-{}", min, max),
        });
    }
    Ok(())
}
