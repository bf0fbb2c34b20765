use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for the batch installer
#[derive(Error, Debug)]
pub enum NullBatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Archive error: {0}")]
    Archive(String),

    #[error("Unsupported archive format: {}", .0.display())]
    UnsupportedArchive(PathBuf),

    #[error("No 7-Zip executable found (tried {0})")]
    ExtractorNotFound(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Failed to launch installer: {0}")]
    Launch(String),

    #[error("TUI error: {0}")]
    Tui(String),

    #[error("Install engine is no longer running")]
    EngineDisconnected,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for the batch installer
pub type Result<T> = std::result::Result<T, NullBatchError>;

impl NullBatchError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        NullBatchError::Config(msg.into())
    }

    /// Create an archive error
    pub fn archive<S: Into<String>>(msg: S) -> Self {
        NullBatchError::Archive(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        NullBatchError::MetricCollection(msg.into())
    }

    pub fn launch<S: Into<String>>(msg: S) -> Self {
        NullBatchError::Launch(msg.into())
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        NullBatchError::Tui(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        NullBatchError::Other(msg.into())
    }
}

impl From<zip::result::ZipError> for NullBatchError {
    fn from(err: zip::result::ZipError) -> Self {
        NullBatchError::Archive(err.to_string())
    }
}
