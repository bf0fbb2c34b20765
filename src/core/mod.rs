// Core business logic module

pub mod archive;
pub mod config;
pub mod install;
pub mod system_monitor;

// Re-export commonly used items
pub use archive::{ArchiveExpander, ArchiveKind, Expansion};
pub use config::Config;
pub use install::{EngineCommand, EngineEvent, EngineHandle, InstallMode, StopPolicy};
