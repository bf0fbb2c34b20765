//! Ordered install queue.
//!
//! Insertion order is install order. The queue is owned by the engine thread;
//! nothing else mutates it.

use std::path::PathBuf;

use super::record::{FileRecord, InstallStatus, RecordId};

#[derive(Debug, Default)]
pub struct InstallQueue {
    records: Vec<FileRecord>,
    next_id: u64,
}

impl InstallQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a Pending record and return a copy of it
    pub fn push(&mut self, path: PathBuf, size_bytes: u64) -> FileRecord {
        self.next_id += 1;
        let record = FileRecord::new(RecordId(self.next_id), path, size_bytes);
        self.records.push(record.clone());
        record
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn get(&self, id: RecordId) -> Option<&FileRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// First Pending record in insertion order
    pub fn next_pending(&self) -> Option<RecordId> {
        self.records
            .iter()
            .find(|r| r.status == InstallStatus::Pending)
            .map(|r| r.id)
    }

    pub fn pending_count(&self) -> usize {
        self.count(InstallStatus::Pending)
    }

    pub fn count(&self, status: InstallStatus) -> usize {
        self.records.iter().filter(|r| r.status == status).count()
    }

    /// Move a record forward in its lifecycle.
    ///
    /// Returns `false` (and changes nothing) for unknown ids and for
    /// transitions out of a terminal state.
    pub fn set_status(&mut self, id: RecordId, status: InstallStatus) -> bool {
        let Some(record) = self.records.iter_mut().find(|r| r.id == id) else {
            return false;
        };

        if !record.status.can_become(status) {
            log::debug!(
                "Ignoring status change {} -> {} for {}",
                record.status,
                status,
                record.id
            );
            return false;
        }

        record.status = status;
        record.progress = status.progress().to_string();
        true
    }

    /// Drop every record, returning how many were removed. Ids keep counting up.
    pub fn clear(&mut self) -> usize {
        let removed = self.records.len();
        self.records.clear();
        removed
    }
}

/// Overall progress of one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunProgress {
    pub total: usize,
    pub finished: usize,
}

impl RunProgress {
    pub fn new(total: usize) -> Self {
        Self { total, finished: 0 }
    }

    /// `floor(finished / total * 100)`; an empty run counts as done
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        let finished = self.finished.min(self.total);
        ((finished * 100) / self.total) as u8
    }
}
