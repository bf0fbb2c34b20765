use std::time::Duration;

use crate::platform::size_in_mb;

/// Queue size column, always in megabytes with one decimal
pub fn format_size_mb(bytes: u64) -> String {
    format!("{:.1} MB", size_in_mb(bytes))
}

/// Format a metric percentage for plain-text output
pub fn format_percent(value: f32) -> String {
    format!("{:5.1}%", value)
}

/// Format elapsed run time (`42s`, `3m 07s`, `1h 02m`)
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    if hours > 0 {
        format!("{}h {:02}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {:02}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
