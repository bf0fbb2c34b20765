//! Installer dashboard command handler.

use anyhow::{Context, Result};
use clap::ArgMatches;
use std::path::PathBuf;

use super::config::resolve_config;
use crate::core::install::EngineHandle;
use crate::ui::installer_tui::run_installer_app;

/// Execute the dashboard (also the default when no subcommand is given)
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = resolve_config(matches)?;

    let files: Vec<PathBuf> = matches
        .get_many::<PathBuf>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    log::info!(
        "Starting dashboard in {} mode, log file {}",
        config.mode,
        config.log_file.display()
    );

    let handle = EngineHandle::spawn(&config).context("Failed to start install engine")?;

    run_installer_app(handle, config.mode, config.log_file.clone(), files)
        .context("Failed to run installer dashboard")
}
