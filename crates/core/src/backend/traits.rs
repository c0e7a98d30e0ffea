//! Trait definitions for the backend module.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use super::error::BackendError;
use crate::converter::{FileType, QualityPreset};

/// A host media framework able to export a source with a quality preset.
pub trait NativeBackend: Send + Sync {
    /// Returns the name of this backend implementation.
    fn name(&self) -> &str;

    /// Offers an export session for `source` with `preset`.
    ///
    /// Returns `None` when the backend cannot handle the pair at all.
    fn create_session(&self, source: &Path, preset: QualityPreset)
        -> Option<Arc<dyn ExportSession>>;
}

/// One export in flight.
///
/// Progress is pull-only: the caller polls [`ExportSession::progress`] while
/// [`ExportSession::export`] is pending.
#[async_trait]
pub trait ExportSession: Send + Sync {
    /// The preset this session was created with.
    fn preset(&self) -> QualityPreset;

    /// Containers this session can write.
    fn supported_file_types(&self) -> &[FileType];

    /// Fraction complete in `[0, 1]`.
    fn progress(&self) -> f64;

    /// Requests cancellation. The export resolves once the backend honors it.
    fn cancel(&self);

    /// Writes the export to `destination`.
    async fn export(&self, destination: &Path, file_type: FileType) -> Result<(), BackendError>;
}
