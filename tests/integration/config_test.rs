use nullbatch::core::config::Config;
use nullbatch::core::install::{InstallMode, StopPolicy};
use nullbatch::core::system_monitor::MetricsBackend;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn test_config_default() {
    let config = Config::default();
    assert_eq!(config.mode, InstallMode::Silent);
    assert_eq!(config.log_file, PathBuf::from("install_log.txt"));
    assert_eq!(config.poll_interval_ms, 1000);
    assert_eq!(config.metrics_interval_ms, 1000);
    assert_eq!(config.stop_policy, StopPolicy::Detach);
    assert!(config.install_timeout_secs.is_none());
}

#[test]
fn test_config_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("config.json");

    let config = Config {
        mode: InstallMode::Interactive,
        install_timeout_secs: Some(600),
        stop_policy: StopPolicy::Kill,
        metrics_backend: MetricsBackend::Command,
        ..Default::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_config_file_uses_lowercase_names() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");

    Config {
        stop_policy: StopPolicy::Kill,
        ..Default::default()
    }
    .save_to(&path)
    .unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains(r#""mode": "silent""#));
    assert!(text.contains(r#""stop_policy": "kill""#));
    assert!(text.contains(r#""metrics_backend": "native""#));
}

#[test]
fn test_config_empty_file_returns_default() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.json");
    std::fs::write(&path, "   \n").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}
