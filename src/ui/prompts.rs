// UI prompts and user interaction module

use colored::Colorize;
use crossterm::tty::IsTty;
use dialoguer::Confirm;
use std::io::{self, BufRead, Write};

/// Ask user for yes/no confirmation
pub fn confirm(message: &str, default: bool) -> anyhow::Result<bool> {
    let answer = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Keep a console window open after a fatal error.
///
/// Only waits when stdin is a terminal, so scripted runs never hang.
pub fn press_enter_to_exit() {
    if !io::stdin().is_tty() {
        return;
    }

    eprint!("{}", "Press Enter to exit...".dimmed());
    io::stderr().flush().ok();

    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}

/// Display a warning message
pub fn warn(message: &str) {
    println!("{}", format!("⚠️  Warning: {}", message).yellow().bold());
}
