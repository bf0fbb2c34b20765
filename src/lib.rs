// NullBatch Library - Public API

// Re-export error types
pub mod error;
pub use error::{NullBatchError, Result};

// Module declarations
pub mod commands;
pub mod core;
pub mod platform;
pub mod ui;

use std::fs::OpenOptions;
use std::path::Path;

// Re-export commonly used types
pub use core::config::Config;

// Initialize logging
pub fn init_logging() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Initialize logging into a file so diagnostics do not draw over the dashboard.
///
/// Falls back to stderr when the file cannot be opened.
pub fn init_file_logging(path: &Path) {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env();

    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(e) => {
            eprintln!("Could not open diagnostics log {}: {}", path.display(), e);
        }
    }

    builder.init();
}
