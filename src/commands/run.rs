//! Headless install run.
//!
//! Queues the given files, drains them in order and prints the install log
//! as it is written. Ctrl+C stops the queue after the current installer.

use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use super::config::resolve_config;
use crate::core::install::{
    EngineCommand, EngineEvent, EngineHandle, EngineSettings, LogLevel, LogLine, RunSummary,
    StopPolicy, SystemLauncher,
};
use crate::ui::{confirm, format_elapsed, show_progress_bar, warn};

/// Exit status when at least one installer failed
pub const EXIT_INSTALL_FAILED: i32 = 2;
/// Exit status when nothing could be queued
pub const EXIT_NOTHING_TO_INSTALL: i32 = 1;

/// Execute the run command, returning the process exit status
pub fn execute(matches: &ArgMatches) -> Result<i32> {
    let mut config = resolve_config(matches)?;

    if let Some(timeout) = matches.get_one::<u64>("timeout") {
        config.install_timeout_secs = Some(*timeout);
    }
    if matches.get_flag("kill-on-stop") {
        config.stop_policy = StopPolicy::Kill;
    }

    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    println!();
    println!("  {}", "NullBatch Installer".bold().purple());
    println!();
    println!("{} {}", "Mode:".dimmed(), config.mode.to_string().yellow());
    println!("{} {}", "Log file:".dimmed(), config.log_file.display());
    if let Some(timeout) = config.install_timeout_secs {
        println!("{} {}s", "Timeout per installer:".dimmed(), timeout);
    }
    println!("{}", "Files:".dimmed());
    for file in &files {
        println!("  • {}", file.display());
    }
    println!();

    if !matches.get_flag("yes") {
        let proceed = confirm("Start installation?", true)?;
        if !proceed {
            println!("{}", "Installation cancelled.".yellow());
            return Ok(0);
        }
    }

    // No meters in headless mode
    let mut settings = EngineSettings::from(&config);
    settings.metrics = None;

    let handle = EngineHandle::spawn_with(settings, Box::new(SystemLauncher))
        .context("Failed to start install engine")?;

    let stopper = handle.commander();
    let stopping = Arc::new(AtomicBool::new(false));
    let stopping_clone = stopping.clone();

    // Setup Ctrl+C handler
    ctrlc::set_handler(move || {
        if stopping_clone.swap(true, Ordering::Relaxed) {
            return;
        }
        println!();
        println!("{}", "Stop requested...".yellow().bold());
        println!(
            "{}",
            "Finishing with the current installer, the rest stay pending.".dimmed()
        );
        let _ = stopper.send(EngineCommand::Stop);
    })
    .map_err(|e| anyhow!("Failed to set Ctrl+C handler: {}", e))?;

    for file in files {
        handle.add(file)?;
    }
    handle.start()?;

    let summary = wait_for_run(&handle)?;
    handle.shutdown();

    let Some(summary) = summary else {
        return Ok(EXIT_NOTHING_TO_INSTALL);
    };

    print_summary(&summary);

    if summary.failed > 0 {
        Ok(EXIT_INSTALL_FAILED)
    } else {
        Ok(0)
    }
}

/// Print engine output until the run ends. `None` when nothing was queued.
fn wait_for_run(handle: &EngineHandle) -> Result<Option<RunSummary>> {
    loop {
        let event = handle
            .events()
            .recv()
            .map_err(|_| anyhow!("Install engine stopped unexpectedly"))?;

        match event {
            EngineEvent::Log(line) => print_log_line(&line),
            EngineEvent::Progress(percent) => {
                show_progress_bar(percent, "Progress");
                println!();
            }
            EngineEvent::Warning(message) => {
                warn(&message);
                return Ok(None);
            }
            EngineEvent::RunFinished(summary) => return Ok(Some(summary)),
            _ => {}
        }
    }
}

fn print_log_line(line: &LogLine) {
    let text = line.text.as_str();
    match line.level {
        LogLevel::Info => println!("{}", text),
        LogLevel::Success => println!("{}", text.green()),
        LogLevel::Warning => println!("{}", text.yellow()),
        LogLevel::Error => println!("{}", text.red()),
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("{}", "─".repeat(50).dimmed());
    println!(
        "{} {}",
        "Completed:".dimmed(),
        summary.completed.to_string().green().bold()
    );
    println!(
        "{} {}",
        "Failed:   ".dimmed(),
        if summary.failed > 0 {
            summary.failed.to_string().red().bold()
        } else {
            summary.failed.to_string().normal()
        }
    );
    if summary.pending > 0 {
        println!(
            "{} {}",
            "Pending:  ".dimmed(),
            summary.pending.to_string().yellow()
        );
    }
    println!(
        "{} {}",
        "Elapsed:  ".dimmed(),
        format_elapsed(summary.elapsed)
    );
    if summary.stopped {
        println!("{}", "Stopped before the queue was exhausted.".yellow());
    }
    println!("{}", "─".repeat(50).dimmed());
}
