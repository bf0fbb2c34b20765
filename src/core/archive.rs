//! Archive expansion for queued files.
//!
//! A `.zip` or `.7z` added to the queue is unpacked next to itself and the
//! installers it contained are queued instead of the archive.

use std::collections::HashSet;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{NullBatchError, Result};
use crate::platform::{find_7zip, has_extension, seven_zip::SEVEN_ZIP_NAMES};

/// Extensions handled by the expander (without dot, lowercase)
pub const ARCHIVE_EXTENSIONS: [&str; 2] = ["zip", "7z"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    SevenZip,
}

impl ArchiveKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "zip" => Some(ArchiveKind::Zip),
            "7z" => Some(ArchiveKind::SevenZip),
            _ => None,
        }
    }
}

pub fn is_archive(path: &Path) -> bool {
    ArchiveKind::from_path(path).is_some()
}

/// Result of unpacking one archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// Where the contents were written (the archive's parent directory)
    pub directory: PathBuf,
    /// Number of file entries the archive held
    pub entry_count: usize,
    /// Installer-like files from the archive, sorted by path
    pub installers: Vec<PathBuf>,
}

pub struct ArchiveExpander {
    installer_extensions: Vec<String>,
}

impl ArchiveExpander {
    pub fn new(installer_extensions: Vec<String>) -> Self {
        Self {
            installer_extensions,
        }
    }

    /// Extract `archive` into its parent directory, overwriting existing files.
    ///
    /// Runs synchronously on the calling thread.
    pub fn expand(&self, archive: &Path) -> Result<Expansion> {
        let kind = ArchiveKind::from_path(archive)
            .ok_or_else(|| NullBatchError::UnsupportedArchive(archive.to_path_buf()))?;

        let directory = archive
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        log::info!("Extracting {} into {}", archive.display(), directory.display());

        let entries = match kind {
            ArchiveKind::Zip => extract_zip(archive, &directory)?,
            ArchiveKind::SevenZip => extract_7z(archive, &directory)?,
        };

        let installers = self.collect_installers(&directory, &entries);

        Ok(Expansion {
            directory,
            entry_count: entries.len(),
            installers,
        })
    }

    /// Installer-like archive entries that now exist on disk under `directory`
    fn collect_installers(&self, directory: &Path, entries: &[PathBuf]) -> Vec<PathBuf> {
        let mut seen = HashSet::new();
        let mut installers: Vec<PathBuf> = entries
            .iter()
            .filter(|entry| has_extension(entry, &self.installer_extensions))
            .map(|entry| directory.join(entry))
            .filter(|path| path.is_file())
            .filter(|path| seen.insert(path.clone()))
            .collect();

        installers.sort();
        installers
    }
}

/// Unpack a zip and return its file entries relative to `directory`.
///
/// Entries whose names would escape the target directory are refused by the
/// zip crate during extraction.
fn extract_zip(archive: &Path, directory: &Path) -> Result<Vec<PathBuf>> {
    let file = File::open(archive)?;
    let mut zip = zip::ZipArchive::new(file)?;

    let mut entries = Vec::new();
    for i in 0..zip.len() {
        let entry = zip.by_index(i)?;
        if entry.is_dir() {
            continue;
        }
        if let Some(name) = entry.enclosed_name() {
            entries.push(name);
        }
    }

    zip.extract(directory)?;

    Ok(entries)
}

fn extract_7z(archive: &Path, directory: &Path) -> Result<Vec<PathBuf>> {
    let seven_zip =
        find_7zip().ok_or_else(|| NullBatchError::ExtractorNotFound(SEVEN_ZIP_NAMES.join(", ")))?;

    let listing = Command::new(&seven_zip)
        .args(["l", "-slt", "-y"])
        .arg(archive)
        .output()?;

    if !listing.status.success() {
        return Err(NullBatchError::archive(format!(
            "7-Zip could not list {}: {}",
            archive.display(),
            String::from_utf8_lossy(&listing.stderr).trim()
        )));
    }

    let entries = parse_7z_listing(&String::from_utf8_lossy(&listing.stdout));

    let output = Command::new(&seven_zip)
        .args(["x", "-y"])
        .arg(format!("-o{}", directory.display()))
        .arg(archive)
        .output()?;

    if !output.status.success() {
        return Err(NullBatchError::archive(format!(
            "7-Zip failed to extract {} (exit code {:?}): {}",
            archive.display(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    Ok(entries)
}

/// File entries from `7z l -slt` output.
///
/// The technical listing prints the archive's own properties first, then a
/// `----------` separator, then one `Path = ...` block per entry. Folder
/// blocks carry `Folder = +` (or a `D` attribute) and are skipped.
pub fn parse_7z_listing(output: &str) -> Vec<PathBuf> {
    let Some((_, body)) = output.split_once("\n----------") else {
        return Vec::new();
    };

    let mut entries = Vec::new();
    let mut path: Option<String> = None;
    let mut is_dir = false;

    let mut flush = |path: &mut Option<String>, is_dir: &mut bool| {
        if let Some(p) = path.take() {
            if !*is_dir && !p.is_empty() {
                entries.push(PathBuf::from(p.replace('\\', "/")));
            }
        }
        *is_dir = false;
    };

    for line in body.lines() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() {
            flush(&mut path, &mut is_dir);
            continue;
        }

        if let Some(value) = line.strip_prefix("Path = ") {
            flush(&mut path, &mut is_dir);
            path = Some(value.to_string());
        } else if line == "Folder = +" {
            is_dir = true;
        } else if let Some(attrs) = line.strip_prefix("Attributes = ") {
            if attrs.starts_with('D') {
                is_dir = true;
            }
        }
    }
    flush(&mut path, &mut is_dir);

    entries
}
