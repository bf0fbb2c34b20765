//! Metrics command handler.
//!
//! Prints host load snapshots without installing anything.

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::time::Duration;

use super::config::resolve_config;
use crate::core::system_monitor::{
    create_source, snapshot_channel, MetricsBackend, MetricsSampler, MetricsSnapshot,
};
use crate::ui::format_percent;

/// Execute the metrics command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;

    let count = matches.get_one::<u32>("count").copied().unwrap_or(5);
    let json_output = matches.get_flag("json");
    let backend = match matches.get_one::<String>("backend").map(String::as_str) {
        Some("command") => MetricsBackend::Command,
        Some("native") => MetricsBackend::Native,
        _ => config.metrics_backend,
    };
    let period = Duration::from_millis(config.metrics_interval_ms.max(1));

    log::info!("Sampling {} snapshots with the {} backend", count, backend);

    let (snapshot_tx, mut snapshot_rx) = snapshot_channel();
    let sampler = MetricsSampler::start(create_source(backend), period, snapshot_tx)
        .context("Failed to start metrics sampler")?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to create runtime")?;

    let result = runtime.block_on(async {
        for _ in 0..count {
            snapshot_rx
                .changed()
                .await
                .map_err(|_| anyhow!("Metrics sampler stopped unexpectedly"))?;
            let snapshot = *snapshot_rx.borrow_and_update();
            print_snapshot(&snapshot, json_output)?;
        }
        Ok::<(), anyhow::Error>(())
    });

    sampler.stop();
    result
}

fn print_snapshot(snapshot: &MetricsSnapshot, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", serde_json::to_string(snapshot)?);
        return Ok(());
    }

    println!(
        "{} {}   {} {}   {} {}",
        "CPU:".dimmed(),
        format_percent(snapshot.cpu).cyan(),
        "Memory:".dimmed(),
        format_percent(snapshot.memory).cyan(),
        "Disk:".dimmed(),
        format_percent(snapshot.disk).cyan()
    );
    Ok(())
}
