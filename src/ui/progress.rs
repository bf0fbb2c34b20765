// Progress bar for headless runs

use colored::Colorize;
use std::io::{self, Write};

const BAR_LENGTH: usize = 30;

/// Build the bar text for a percentage, `[=====     ]`
pub fn progress_bar(percent: u8) -> String {
    let percent = usize::from(percent.min(100));
    let filled = percent * BAR_LENGTH / 100;
    let empty = BAR_LENGTH - filled;
    format!("[{}{}]", "=".repeat(filled), " ".repeat(empty))
}

/// Display the overall progress on the current line
///
/// # Arguments
/// * `percent` - Overall progress, 0..=100
/// * `prefix` - Text to display before the progress bar
pub fn show_progress_bar(percent: u8, prefix: &str) {
    print!(
        "\r{} {} {}% ",
        prefix.white(),
        progress_bar(percent).green(),
        percent.min(100)
    );

    io::stdout().flush().ok();
}
