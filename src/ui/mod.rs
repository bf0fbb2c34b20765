// UI and formatting module

pub mod formatters;
pub mod installer_tui;
pub mod progress;
pub mod prompts;

// Re-export commonly used items for cleaner imports
pub use formatters::{format_elapsed, format_percent, format_size_mb};
pub use progress::show_progress_bar;
pub use prompts::{confirm, press_enter_to_exit, warn};
