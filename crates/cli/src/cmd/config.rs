//! Configuration management command
//!
//! Provides CLI interface to view and edit the seismo configuration.

use crate::system_config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use seismo_core::{Config, MAX_LINE_OFFSET};
use std::path::Path;

const KEYS: &[&str] = &[
    "sensor.chip",
    "sensor.lines",
    "sensor.hardware_debounce_ms",
    "sensor.pull_up",
    "debounce.suppress_window_ms",
    "debounce.report_trigger_secs",
    "debounce.loop_pause_ms",
    "storage.data_dir",
    "storage.event_log",
    "storage.report_file",
    "schedule.enabled",
    "schedule.hours",
    "schedule.minute",
    "schedule.second",
];

/// List all configuration values
pub async fn run_list(override_path: Option<&Path>) -> Result<()> {
    let config = system_config::load(override_path)?;
    let config_path = system_config::config_file_path(override_path)?;

    println!("{}", "Seismo Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    let mut section = "";
    for &key in KEYS {
        let (head, name) = key.split_once('.').unwrap_or(("", key));
        if head != section {
            if !section.is_empty() {
                println!();
            }
            println!("{}", format!("[{}]", head).yellow());
            section = head;
        }
        println!("  {} = {}", name.cyan(), get_value(&config, key)?);
    }

    println!("\n{}", "Valid Ranges:".bold());
    println!("  suppress_window_ms: 1-60000 (must be below report_trigger_secs)");
    println!("  report_trigger_secs: 1-86400");
    println!("  loop_pause_ms: 0-5000 (0 = no pause)");
    println!("  hardware_debounce_ms: 0-10000 (0 = kernel debounce off)");
    println!("  lines: 1-64 offsets, each 0-{}", MAX_LINE_OFFSET);
    println!("  hours: 0-23, minute/second: 0-59");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(override_path: Option<&Path>, key: &str) -> Result<()> {
    let config = system_config::load(override_path)?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value
pub async fn run_set(override_path: Option<&Path>, key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load(override_path)?;
    set_value(&mut config, key, value)?;

    config.validate().context("Invalid configuration value")?;
    system_config::save(override_path, &config)?;

    println!("{} {} = {}", "✓".green(), key.cyan(), value);
    println!(
        "{}",
        "Note: Restart daemon for changes to take effect (seismo stop && seismo start)".yellow()
    );

    Ok(())
}

/// Show the config file path and optionally create it
pub async fn run_path(override_path: Option<&Path>, create: bool) -> Result<()> {
    let config_path = system_config::config_file_path(override_path)?;

    if create && system_config::init_if_missing(override_path)? {
        println!("{} Created config file at: {}", "✓".green(), config_path.display());
    } else if config_path.exists() {
        println!("{}", config_path.display());
    } else {
        println!("{}", config_path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}

fn unknown_key(key: &str) -> anyhow::Error {
    anyhow::anyhow!(
        "Unknown config key: {}. Use 'seismo config list' to see available keys.",
        key
    )
}

fn join<T: ToString>(values: &[T]) -> String {
    values.iter().map(T::to_string).collect::<Vec<_>>().join(",")
}

fn get_value(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "sensor.chip" => config.sensor.chip.clone(),
        "sensor.lines" => join(&config.sensor.lines),
        "sensor.hardware_debounce_ms" => config.sensor.hardware_debounce_ms.to_string(),
        "sensor.pull_up" => config.sensor.pull_up.to_string(),
        "debounce.suppress_window_ms" => config.debounce.suppress_window_ms.to_string(),
        "debounce.report_trigger_secs" => config.debounce.report_trigger_secs.to_string(),
        "debounce.loop_pause_ms" => config.debounce.loop_pause_ms.to_string(),
        "storage.data_dir" => config.storage.data_dir.display().to_string(),
        "storage.event_log" => config.storage.event_log.clone(),
        "storage.report_file" => config.storage.report_file.clone(),
        "schedule.enabled" => config.schedule.enabled.to_string(),
        "schedule.hours" => join(&config.schedule.hours),
        "schedule.minute" => config.schedule.minute.to_string(),
        "schedule.second" => config.schedule.second.to_string(),
        _ => return Err(unknown_key(key)),
    };
    Ok(value)
}

fn parse_number<T: std::str::FromStr>(value: &str) -> Result<T> {
    value
        .trim()
        .parse::<T>()
        .ok()
        .context("Invalid value: must be a non-negative integer")
}

fn parse_bool(value: &str) -> Result<bool> {
    value.trim().parse().ok().context("Invalid value: must be 'true' or 'false'")
}

fn parse_list<T: std::str::FromStr>(value: &str) -> Result<Vec<T>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            item.parse::<T>()
                .ok()
                .with_context(|| format!("Invalid list item '{}': must be a non-negative integer", item))
        })
        .collect()
}

fn set_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    match key {
        "sensor.chip" => config.sensor.chip = value.to_string(),
        "sensor.lines" => config.sensor.lines = parse_list(value)?,
        "sensor.hardware_debounce_ms" => config.sensor.hardware_debounce_ms = parse_number(value)?,
        "sensor.pull_up" => config.sensor.pull_up = parse_bool(value)?,
        "debounce.suppress_window_ms" => config.debounce.suppress_window_ms = parse_number(value)?,
        "debounce.report_trigger_secs" => config.debounce.report_trigger_secs = parse_number(value)?,
        "debounce.loop_pause_ms" => config.debounce.loop_pause_ms = parse_number(value)?,
        "storage.data_dir" => config.storage.data_dir = value.into(),
        "storage.event_log" => config.storage.event_log = value.to_string(),
        "storage.report_file" => config.storage.report_file = value.to_string(),
        "schedule.enabled" => config.schedule.enabled = parse_bool(value)?,
        "schedule.hours" => config.schedule.hours = parse_list(value)?,
        "schedule.minute" => config.schedule.minute = parse_number(value)?,
        "schedule.second" => config.schedule.second = parse_number(value)?,
        _ => return Err(unknown_key(key)),
    }
    Ok(())
}
