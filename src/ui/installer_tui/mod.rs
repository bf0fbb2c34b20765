//! Terminal dashboard for the batch installer.
//!
//! Provides the queue table, live log and host meters using ratatui.

mod app;
mod event_handler;
mod render;
mod widgets;

pub use app::{run_installer_app, InstallerApp};
pub use event_handler::InstallerEvent;
