//! Append-only install log.
//!
//! One line per event, `[HH:MM:SS] <message>`. The file is opened, appended
//! and closed on every call so an external viewer always sees complete lines.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Display severity of a log line. Not written to the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    pub level: LogLevel,
    /// Formatted line including the timestamp prefix
    pub text: String,
}

pub struct InstallLog {
    path: PathBuf,
}

impl InstallLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write one line and return it for display.
    ///
    /// Write failures only reach the diagnostics log.
    pub fn append(&self, level: LogLevel, message: &str) -> LogLine {
        let text = format_line(Local::now(), message);

        if let Err(e) = self.write_line(&text) {
            log::warn!("Could not write install log {}: {}", self.path.display(), e);
        }

        LogLine { level, text }
    }

    fn write_line(&self, text: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", text)
    }
}

pub fn format_line(time: DateTime<Local>, message: &str) -> String {
    format!("[{}] {}", time.format("%H:%M:%S"), message)
}
