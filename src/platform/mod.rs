// Platform-specific code module

pub mod drop_paths;
pub mod fs;
pub mod seven_zip;

// Re-exports para imports limpios
pub use drop_paths::parse_dropped_paths;
pub use fs::{
    display_name, expand_tilde, file_size_bytes, has_extension, resolve_path, size_in_mb,
};
pub use seven_zip::find_7zip;
