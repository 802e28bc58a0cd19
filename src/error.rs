//! Error types shared by every stage of a sorting run.
//!
//! Only a handful of these abort a run (an unusable root folder or a broken
//! configuration). The rest describe a single file or folder and are caught by
//! the sorter, logged, and recorded in the run report.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for clean-folder operations.
pub type Result<T> = std::result::Result<T, CleanError>;

/// Errors that can occur while sorting a folder.
#[derive(Error, Debug)]
pub enum CleanError {
    /// The root folder does not exist or cannot be read.
    #[error("Cannot open root folder {}: {source}", path.display())]
    FileSystem {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The root path exists but is not a directory.
    #[error("Root path {} is not a directory", path.display())]
    NotADirectory { path: PathBuf },

    /// Failed to create a category or extraction folder.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Failed to move a file into its category folder.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    FileMove {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// The archive could not be unpacked.
    #[error("Failed to extract {}: {reason}", path.display())]
    Extraction { path: PathBuf, reason: String },

    /// Failed to remove a folder or file.
    #[error("Failed to remove {}: {source}", path.display())]
    Removal {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Loading or compiling the configuration failed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Serializing the run report failed.
    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}

impl CleanError {
    /// Wraps an extraction failure from any archive backend.
    pub(crate) fn extraction(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Extraction {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
