use serde::{Deserialize, Serialize};
use std::fmt;

/// One reading of host load, all values in percent (0.0..=100.0)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub timestamp: i64, // Unix timestamp
    pub cpu: f32,
    pub memory: f32,
    pub disk: f32,
}

impl MetricsSnapshot {
    /// Reported when a sampling cycle fails
    pub fn zeroed() -> Self {
        Self {
            timestamp: chrono::Utc::now().timestamp(),
            ..Default::default()
        }
    }
}

/// Where metrics come from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricsBackend {
    /// OS counters through `sysinfo`
    #[default]
    Native,
    /// Shell out to `wmic` / `top`, `free`, `df` and parse their output
    Command,
}

impl fmt::Display for MetricsBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricsBackend::Native => f.write_str("native"),
            MetricsBackend::Command => f.write_str("command"),
        }
    }
}

/// `(total - free) / total * 100`, zero when the total is unknown
pub fn used_percent(total: u64, free: u64) -> f32 {
    if total == 0 {
        return 0.0;
    }
    (total.saturating_sub(free) as f64 / total as f64 * 100.0) as f32
}
