use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::install::{InstallMode, StopPolicy};
use crate::core::system_monitor::MetricsBackend;

pub const DEFAULT_LOG_FILE: &str = "install_log.txt";

/// Persistent settings for the batch installer.
///
/// Every field has a default so older or hand-edited files keep loading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Invocation mode, fixed for the lifetime of the process
    pub mode: InstallMode,
    /// Append-only install log, relative paths resolve against the working directory
    pub log_file: PathBuf,
    /// How often a running installer is checked for exit
    pub poll_interval_ms: u64,
    /// Metrics reporting cadence
    pub metrics_interval_ms: u64,
    pub metrics_backend: MetricsBackend,
    /// Kill installers that run longer than this. `None` waits forever.
    pub install_timeout_secs: Option<u64>,
    /// What happens to a running installer when the user stops the queue
    pub stop_policy: StopPolicy,
    /// Extensions (without dot, lowercase) picked up from archives and folders
    pub installer_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: InstallMode::Silent,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            poll_interval_ms: 1000,
            metrics_interval_ms: 1000,
            metrics_backend: MetricsBackend::Native,
            install_timeout_secs: None,
            stop_policy: StopPolicy::Detach,
            installer_extensions: vec!["exe".to_string(), "msi".to_string()],
        }
    }
}

impl Config {
    /// Load from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let data = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Config::default());
        }

        let config = serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!(
                "Ignoring unreadable config file {:?} ({}), using defaults",
                config_path,
                e
            );
            Config::default()
        });

        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data =
            serde_json::to_string_pretty(self).with_context(|| "Failed to serialize config")?;

        fs::write(config_path, data)
            .with_context(|| format!("Failed to write config file: {:?}", config_path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("nullbatch"))
    }

    /// Diagnostics file used while the dashboard owns the terminal
    pub fn get_diagnostics_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("diagnostics.log"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = Config::load_from(&temp.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.mode, InstallMode::Silent);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, r#"{ "mode": "interactive", "install_timeout_secs": 30 }"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.mode, InstallMode::Interactive);
        assert_eq!(config.install_timeout_secs, Some(30));
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
    }

    #[test]
    fn test_garbage_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.json");
        fs::write(&path, "not json at all").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
    }
}
