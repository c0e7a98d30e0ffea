//! Error types for the destination module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving a destination.
#[derive(Debug, Error)]
pub enum DestinationError {
    /// Removing an existing file for overwrite failed.
    #[error("Failed to remove existing file {}: {source}", .path.display())]
    RemoveFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checking whether a candidate path exists failed.
    #[error("Failed to inspect {}: {source}", .path.display())]
    InspectFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Every numbered candidate was already taken.
    #[error("No free file name for {} after {attempts} attempts", .base.display())]
    UniquifyExhausted { base: PathBuf, attempts: u32 },

    /// The source path has no file name to derive a destination from.
    #[error("Cannot derive a destination from {}", .path.display())]
    InvalidSource { path: PathBuf },
}

impl DestinationError {
    /// Creates a remove failed error.
    pub fn remove_failed(path: PathBuf, source: std::io::Error) -> Self {
        Self::RemoveFailed { path, source }
    }

    /// Creates an inspect failed error.
    pub fn inspect_failed(path: PathBuf, source: std::io::Error) -> Self {
        Self::InspectFailed { path, source }
    }
}
