use ratatui::{prelude::*, widgets::Gauge};

use crate::core::install::{InstallStatus, LogLevel};

// Purple palette
pub const WINDOW_BG: Color = Color::Rgb(0x2E, 0x1A, 0x47);
pub const BASE_BG: Color = Color::Rgb(0x3E, 0x2A, 0x57);
pub const ACCENT: Color = Color::Rgb(0x8A, 0x2B, 0xE2);
pub const TEXT: Color = Color::White;

/// Create a gauge with color based on value thresholds
pub fn colored_gauge<'a>(value: f64, label: &'a str) -> Gauge<'a> {
    let color = match value {
        v if v < 50.0 => Color::Cyan,
        v if v < 75.0 => Color::LightYellow,
        v if v < 90.0 => Color::LightRed,
        _ => Color::Red,
    };

    Gauge::default()
        .gauge_style(Style::default().fg(color).bg(BASE_BG))
        .ratio((value / 100.0).clamp(0.0, 1.0))
        .label(label)
}

/// Overall install progress, drawn in the accent color
pub fn progress_gauge<'a>(percent: u8, label: &'a str) -> Gauge<'a> {
    Gauge::default()
        .gauge_style(Style::default().fg(ACCENT).bg(BASE_BG))
        .percent(u16::from(percent.min(100)))
        .label(label)
}

pub fn status_color(status: InstallStatus) -> Color {
    match status {
        InstallStatus::Pending => TEXT,
        InstallStatus::Installing => Color::LightYellow,
        InstallStatus::Completed => Color::LightGreen,
        InstallStatus::Failed => Color::LightRed,
    }
}

pub fn log_color(level: LogLevel) -> Color {
    match level {
        LogLevel::Info => TEXT,
        LogLevel::Success => Color::LightGreen,
        LogLevel::Warning => Color::LightYellow,
        LogLevel::Error => Color::LightRed,
    }
}
