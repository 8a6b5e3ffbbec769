//! Error types for codescroll

use std::path::PathBuf;
use thiserror::Error;

/// Run-level failures. Any of these aborts the whole document.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Repository root is not a readable directory: {}: {reason}", .path.display())]
    RootUnreadable { path: PathBuf, reason: String },

    #[error("Directory enumeration failed: {0}")]
    Walk(#[from] ignore::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] Box<figment::Error>),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl From<figment::Error> for EngineError {
    fn from(e: figment::Error) -> Self {
        Self::Config(Box::new(e))
    }
}

/// Per-file rendering failures. These never abort a run; they become an
/// inline placeholder for the affected file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    #[error("Failed to read file: {0}")]
    Io(String),

    #[error("File is not valid UTF-8: {0}")]
    Decode(String),

    #[error("Highlighting failed: {0}")]
    Highlight(String),
}

impl From<std::io::Error> for RenderError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<std::string::FromUtf8Error> for RenderError {
    fn from(e: std::string::FromUtf8Error) -> Self {
        Self::Decode(e.utf8_error().to_string())
    }
}

/// Result alias for run-level operations
pub type Result<T> = std::result::Result<T, EngineError>;
