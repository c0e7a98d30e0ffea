//! Error types for the converter module.

use std::path::PathBuf;
use thiserror::Error;

use crate::backend::BackendError;
use crate::destination::DestinationError;

/// Reasons a conversion job ends in `Failed`.
#[derive(Debug, Error)]
pub enum ConversionError {
    /// No native preset can produce the requested container.
    #[error("No compatible export preset available. Try a different format.")]
    NoCompatibleEncoder,

    /// The external transcoder could not be located.
    #[error("FFmpeg binary not found in app bundle or common system paths.")]
    BackendUnavailable,

    /// The external transcoder was located but could not be started.
    #[error("FFmpeg failed to start. Check the binary at {} is executable.", .program.display())]
    LaunchFailure {
        program: PathBuf,
        log_path: Option<PathBuf>,
    },

    /// The external transcoder exited with a non-zero code.
    #[error("FFmpeg conversion failed with code {code}.")]
    ProcessFailure {
        code: i32,
        log_path: Option<PathBuf>,
    },

    /// Destination resolution failed.
    #[error(transparent)]
    Destination(#[from] DestinationError),

    /// The native backend reported a failure.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ConversionError {
    /// Diagnostic log written by the transcoder, if any.
    pub fn log_path(&self) -> Option<&PathBuf> {
        match self {
            Self::LaunchFailure { log_path, .. } | Self::ProcessFailure { log_path, .. } => {
                log_path.as_ref()
            }
            Self::Backend(e) => e.log_path(),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoCompatibleEncoder => "no_compatible_encoder",
            Self::BackendUnavailable => "backend_unavailable",
            Self::LaunchFailure { .. } => "launch_failure",
            Self::ProcessFailure { .. } => "process_failure",
            Self::Destination(_) => "destination",
            Self::Backend(_) => "backend",
        }
    }
}
