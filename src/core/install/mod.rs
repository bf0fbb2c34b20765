//! Install queue, installer launching and the engine thread that drives them.

mod engine;
mod launcher;
mod log;
mod queue;
mod record;

pub use engine::{
    Engine, EngineCommand, EngineEvent, EngineHandle, EngineSettings, RunState, RunSummary,
};
pub use launcher::{
    ExitOutcome, InstallMode, InstallerProcess, Invocation, Launcher, StopPolicy, SystemLauncher,
    SILENT_FLAGS,
};
pub use log::{format_line, InstallLog, LogLevel, LogLine};
pub use queue::{InstallQueue, RunProgress};
pub use record::{FileRecord, InstallStatus, RecordId};
