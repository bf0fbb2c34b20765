use anyhow::{Context, Result};
use clap::ArgMatches;
use colored::Colorize;
use std::path::PathBuf;

use crate::core::install::InstallMode;
use crate::core::Config;

/// Config file chosen by `--config`, or the default location
pub fn config_path(matches: &ArgMatches) -> Result<PathBuf> {
    match matches.get_one::<PathBuf>("config") {
        Some(path) => Ok(path.clone()),
        None => Config::get_config_path(),
    }
}

/// Load the config file and apply the global command line overrides
pub fn resolve_config(matches: &ArgMatches) -> Result<Config> {
    let path = config_path(matches)?;
    let mut config = Config::load_from(&path)?;

    if let Some(log_file) = matches.get_one::<PathBuf>("log-file") {
        config.log_file = log_file.clone();
    }

    if matches.get_flag("interactive") {
        config.mode = InstallMode::Interactive;
    } else if matches.get_flag("silent") {
        config.mode = InstallMode::Silent;
    }

    Ok(config)
}

pub fn execute(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("show", sub_matches)) => show(sub_matches),
        Some(("path", sub_matches)) => {
            println!("{}", config_path(sub_matches)?.display());
            Ok(())
        }
        Some(("init", sub_matches)) => init(sub_matches),
        _ => {
            println!("Use 'nullbatch config --help' for more information.");
            Ok(())
        }
    }
}

fn show(matches: &ArgMatches) -> Result<()> {
    let path = config_path(matches)?;
    let config = resolve_config(matches)?;

    println!("{} {}", "Config file:".dimmed(), path.display());
    if !path.exists() {
        println!("{}", "(not created yet, showing defaults)".dimmed());
    }
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).context("Failed to serialize config")?
    );

    Ok(())
}

fn init(matches: &ArgMatches) -> Result<()> {
    let path = config_path(matches)?;
    let force = matches.get_flag("force");

    if path.exists() && !force {
        println!(
            "{} {}",
            "Config already exists:".yellow(),
            path.display()
        );
        println!("{}", "Use --force to overwrite it with defaults.".dimmed());
        return Ok(());
    }

    Config::default()
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    println!("{} {}", "✓ Wrote default config to".green(), path.display());
    Ok(())
}
