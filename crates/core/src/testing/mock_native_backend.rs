//! Mock native backend for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::RwLock;

use crate::backend::{preset_file_types, BackendError, ExportSession, NativeBackend};
use crate::converter::{FileType, QualityPreset};
use crate::supervisor::CancelSignal;

/// A recorded export for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedExport {
    /// Source the session was created for.
    pub source: PathBuf,
    /// Preset the session was created with.
    pub preset: QualityPreset,
    /// Where the export was written.
    pub destination: PathBuf,
    /// Requested container.
    pub file_type: FileType,
}

#[derive(Debug, Clone)]
struct Behavior {
    capabilities: HashMap<QualityPreset, Vec<FileType>>,
    progress_steps: Vec<f64>,
    step_delay: Duration,
    failure: Option<String>,
    hold_until_cancelled: bool,
}

/// Mock implementation of the NativeBackend trait.
///
/// Provides controllable behavior for testing:
/// - Per-preset capability sets (defaults to the ffmpeg export presets)
/// - Scripted progress values reported while exporting
/// - Simulated failure or a session that runs until cancelled
/// - Records created sessions and performed exports
///
/// Successful exports write an empty file at the destination.
#[derive(Debug, Clone)]
pub struct MockNativeBackend {
    behavior: Behavior,
    created: Arc<Mutex<Vec<QualityPreset>>>,
    exports: Arc<RwLock<Vec<RecordedExport>>>,
}

impl Default for MockNativeBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNativeBackend {
    /// Create a mock with the default preset capabilities.
    pub fn new() -> Self {
        let capabilities = [
            QualityPreset::Passthrough,
            QualityPreset::HighestQuality,
            QualityPreset::MediumQuality,
            QualityPreset::LowQuality,
            QualityPreset::AppleM4a,
        ]
        .into_iter()
        .map(|p| (p, preset_file_types(p).to_vec()))
        .collect();

        Self {
            behavior: Behavior {
                capabilities,
                progress_steps: vec![0.25, 0.5, 0.75],
                step_delay: Duration::from_millis(5),
                failure: None,
                hold_until_cancelled: false,
            },
            created: Arc::new(Mutex::new(Vec::new())),
            exports: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Override the containers a preset can write. An empty list makes the
    /// backend refuse to create sessions for that preset.
    pub fn with_capabilities(mut self, preset: QualityPreset, file_types: Vec<FileType>) -> Self {
        self.behavior.capabilities.insert(preset, file_types);
        self
    }

    /// Set the progress values reported during export, one per step.
    pub fn with_progress_steps(mut self, steps: Vec<f64>, delay: Duration) -> Self {
        self.behavior.progress_steps = steps;
        self.behavior.step_delay = delay;
        self
    }

    /// Make every export fail with `reason`.
    pub fn with_failure(mut self, reason: impl Into<String>) -> Self {
        self.behavior.failure = Some(reason.into());
        self
    }

    /// Keep exports running until cancelled.
    pub fn hold_until_cancelled(mut self) -> Self {
        self.behavior.hold_until_cancelled = true;
        self
    }

    /// Presets sessions were created for, in order.
    pub fn created_sessions(&self) -> Vec<QualityPreset> {
        self.created.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Get all recorded exports.
    pub async fn recorded_exports(&self) -> Vec<RecordedExport> {
        self.exports.read().await.clone()
    }
}

impl NativeBackend for MockNativeBackend {
    fn name(&self) -> &str {
        "mock"
    }

    fn create_session(
        &self,
        source: &Path,
        preset: QualityPreset,
    ) -> Option<Arc<dyn ExportSession>> {
        let file_types = self
            .behavior
            .capabilities
            .get(&preset)
            .filter(|types| !types.is_empty())?
            .clone();
        if let Ok(mut created) = self.created.lock() {
            created.push(preset);
        }
        Some(Arc::new(MockExportSession {
            source: source.to_path_buf(),
            preset,
            file_types,
            behavior: self.behavior.clone(),
            progress: AtomicU64::new(0f64.to_bits()),
            cancel: CancelSignal::new(),
            exports: Arc::clone(&self.exports),
        }))
    }
}

struct MockExportSession {
    source: PathBuf,
    preset: QualityPreset,
    file_types: Vec<FileType>,
    behavior: Behavior,
    progress: AtomicU64,
    cancel: CancelSignal,
    exports: Arc<RwLock<Vec<RecordedExport>>>,
}

impl MockExportSession {
    fn set_progress(&self, value: f64) {
        self.progress.store(value.to_bits(), Ordering::Release);
    }
}

#[async_trait]
impl ExportSession for MockExportSession {
    fn preset(&self) -> QualityPreset {
        self.preset
    }

    fn supported_file_types(&self) -> &[FileType] {
        &self.file_types
    }

    fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Acquire))
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    async fn export(&self, destination: &Path, file_type: FileType) -> Result<(), BackendError> {
        self.exports.write().await.push(RecordedExport {
            source: self.source.clone(),
            preset: self.preset,
            destination: destination.to_path_buf(),
            file_type,
        });

        for step in &self.behavior.progress_steps {
            tokio::select! {
                _ = tokio::time::sleep(self.behavior.step_delay) => self.set_progress(*step),
                _ = self.cancel.cancelled() => return Err(BackendError::Cancelled),
            }
        }
        if self.behavior.hold_until_cancelled {
            self.cancel.cancelled().await;
        }
        if self.cancel.is_cancelled() {
            return Err(BackendError::Cancelled);
        }
        if let Some(reason) = &self.behavior.failure {
            return Err(BackendError::failed(reason.clone()));
        }

        tokio::fs::write(destination, b"")
            .await
            .map_err(|e| BackendError::failed(e.to_string()))?;
        self.set_progress(1.0);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_mock_backend_exports() {
        let dir = TempDir::new().unwrap();
        let backend = MockNativeBackend::new().with_progress_steps(vec![0.5], Duration::ZERO);
        let session = backend
            .create_session(Path::new("/media/clip.mov"), QualityPreset::Passthrough)
            .unwrap();
        let destination = dir.path().join("clip.mp4");

        session.export(&destination, FileType::Mpeg4).await.unwrap();

        assert!(destination.exists());
        assert_eq!(session.progress(), 1.0);
        assert_eq!(backend.created_sessions(), vec![QualityPreset::Passthrough]);
        assert_eq!(backend.recorded_exports().await.len(), 1);
    }

    #[test]
    fn test_empty_capabilities_refuse_session() {
        let backend = MockNativeBackend::new().with_capabilities(QualityPreset::Passthrough, vec![]);
        assert!(backend
            .create_session(Path::new("/media/clip.mov"), QualityPreset::Passthrough)
            .is_none());
    }
}
