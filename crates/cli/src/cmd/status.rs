//! Show daemon and event log status

use crate::{daemon, system_config, util};
use anyhow::Result;
use chrono::Local;
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = system_config::load(config_path)?;
    let storage = &config.storage;

    let holder = daemon::running(&config);
    let log_path = storage.event_log_path();
    let today = Local::now().format("%Y-%m-%d").to_string();
    let summary = util::summarize_log(&log_path, &today)?;

    println!("{}", "Seismo Status".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!();

    println!("Data dir:      {}", storage.data_dir.display().to_string().cyan());
    println!();

    print!("Daemon:        ");
    if let Some(holder) = holder {
        println!("{}", "Running ✓".green());
        println!("  PID:         {}", holder.pid);
        println!(
            "  Started:     {} ({})",
            util::format_relative_time(holder.started_at),
            util::format_absolute_time(holder.started_at).dimmed()
        );
    } else {
        println!("{}", "Not running".yellow());
        println!("  {}", "Tip: Start with 'seismo start'".dimmed());
    }
    println!();

    println!("Sensor:");
    println!("  Chip:        {}", config.sensor.chip);
    println!(
        "  Lines:       {}",
        config
            .sensor
            .lines
            .iter()
            .map(|line| line.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("  Window:      {} ms", config.debounce.suppress_window_ms);
    println!();

    println!("Event log:     {}", log_path.display());
    println!("  Events:      {}", summary.events);
    println!("  Today:       {}", summary.today);
    match &summary.last {
        Some(record) => println!("  Last:        {} {}", record.time(), record.event.yellow()),
        None => println!("  {}", "No events yet".dimmed()),
    }
    if let Ok(metadata) = std::fs::metadata(&log_path) {
        println!("  Size:        {}", util::format_size(metadata.len()));
    }
    println!();

    let report_path = storage.report_path();
    println!("Report:        {}", report_path.display());
    match std::fs::metadata(&report_path).and_then(|m| m.modified()) {
        Ok(modified) => {
            let ts = util::system_time_ms(modified);
            println!(
                "  Updated:     {} ({})",
                util::format_relative_time(ts),
                util::format_absolute_time(ts).dimmed()
            );
        }
        Err(_) => println!("  {}", "Not generated yet (run 'seismo report')".dimmed()),
    }

    Ok(())
}
