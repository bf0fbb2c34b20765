// Filesystem helpers shared by the queue and the archive expander

use std::path::{Path, PathBuf};

/// Case-insensitive extension check against a list of bare extensions (`"exe"`, `"msi"`)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|candidate| candidate.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// File name shown in the queue and the log
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn file_size_bytes(path: &Path) -> std::io::Result<u64> {
    Ok(std::fs::metadata(path)?.len())
}

/// Replace a leading `~` with the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };
    match dirs::home_dir() {
        Some(home) => home.join(rest),
        None => path.to_path_buf(),
    }
}

/// Absolute form of a user-supplied path.
///
/// Installers are spawned by path, and a bare relative name would be looked
/// up on `PATH` instead of the working directory.
pub fn resolve_path(path: &Path) -> PathBuf {
    let expanded = expand_tilde(path);
    std::path::absolute(&expanded).unwrap_or(expanded)
}

pub fn size_in_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
