use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::platform::display_name;

/// Stable identifier of a queued file, unique for the lifetime of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle of one record: `Pending -> Installing -> Completed | Failed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallStatus {
    Pending,
    Installing,
    Completed,
    Failed,
}

impl InstallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            InstallStatus::Pending => "Pending",
            InstallStatus::Installing => "Installing",
            InstallStatus::Completed => "Completed",
            InstallStatus::Failed => "Failed",
        }
    }

    /// Allowed forward transitions; terminal states never move again
    pub fn can_become(&self, next: InstallStatus) -> bool {
        matches!(
            (self, next),
            (InstallStatus::Pending, InstallStatus::Installing)
                | (InstallStatus::Installing, InstallStatus::Completed)
                | (InstallStatus::Installing, InstallStatus::Failed)
        )
    }

    /// Coarse progress text shown next to the status
    pub fn progress(&self) -> &'static str {
        match self {
            InstallStatus::Completed => "100%",
            _ => "0%",
        }
    }
}

impl fmt::Display for InstallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One installable unit in the queue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: RecordId,
    pub path: PathBuf,
    pub status: InstallStatus,
    /// `"0%"` or `"100%"`, no byte-level progress is tracked
    pub progress: String,
    pub size_bytes: u64,
}

impl FileRecord {
    pub fn new(id: RecordId, path: PathBuf, size_bytes: u64) -> Self {
        Self {
            id,
            path,
            status: InstallStatus::Pending,
            progress: InstallStatus::Pending.progress().to_string(),
            size_bytes,
        }
    }

    pub fn name(&self) -> String {
        display_name(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
