//! Locating a 7-Zip command line executable.

use std::path::PathBuf;

/// Executable names tried on `PATH`, in order
pub const SEVEN_ZIP_NAMES: &[&str] = &["7z", "7za", "7zr"];

/// Find a 7-Zip executable on `PATH` or in the usual install folders
pub fn find_7zip() -> Option<PathBuf> {
    for name in SEVEN_ZIP_NAMES {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    #[cfg(windows)]
    {
        let paths = [
            PathBuf::from(r"C:\Program Files\7-Zip\7z.exe"),
            PathBuf::from(r"C:\Program Files (x86)\7-Zip\7z.exe"),
        ];

        for path in paths {
            if path.exists() {
                return Some(path);
            }
        }
    }

    None
}
