//! Error types for the backend module.

use std::path::PathBuf;
use thiserror::Error;

use crate::converter::{FileType, QualityPreset};

/// Errors reported by a native export session.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend's encoder could not be found on this host.
    #[error("Export backend is not available on this host")]
    Unavailable,

    /// The session cannot write the requested container.
    #[error("Preset {} cannot write {file_type:?} files", .preset.as_str())]
    UnsupportedFileType {
        preset: QualityPreset,
        file_type: FileType,
    },

    /// The export ran and failed.
    #[error("Export failed: {reason}")]
    ExportFailed {
        reason: String,
        log_path: Option<PathBuf>,
    },

    /// The export stopped after a cancellation request.
    #[error("Export cancelled")]
    Cancelled,
}

impl BackendError {
    /// Creates an export failure without a log.
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::ExportFailed {
            reason: reason.into(),
            log_path: None,
        }
    }

    /// Diagnostic log for the failed export, if any.
    pub fn log_path(&self) -> Option<&PathBuf> {
        match self {
            Self::ExportFailed { log_path, .. } => log_path.as_ref(),
            _ => None,
        }
    }
}
