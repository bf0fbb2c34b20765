// Command handlers module
pub mod completions;
pub mod config;
pub mod metrics;
pub mod run;
pub mod tui;

// Re-exports for cleaner imports
pub use config::resolve_config;
pub use metrics::execute as metrics;
pub use run::execute as run;
pub use tui::execute as tui;
