//! Regenerate the report on demand

use crate::system_config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use seismo_core::TriggerReason;
use seismo_journal::ReportGenerator;
use std::path::Path;
use tokio::runtime::Handle;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = system_config::load(config_path)?;
    let generator = ReportGenerator::new(
        config.storage.event_log_path(),
        config.storage.report_path(),
        Handle::current(),
    );

    let worker = generator.clone();
    let summary = tokio::task::spawn_blocking(move || worker.generate_now(TriggerReason::Manual))
        .await
        .context("Report task failed")??;

    println!(
        "{} Report written: {}",
        "✓".green(),
        generator.report_path().display().to_string().cyan()
    );
    println!("  Events:  {}", summary.events);
    println!("  Days:    {}", summary.days);
    if summary.skipped > 0 {
        println!(
            "  {}",
            format!("Skipped {} unreadable event log lines", summary.skipped).yellow()
        );
    }
    Ok(())
}
