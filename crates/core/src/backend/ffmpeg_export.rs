//! Preset-driven export backend running the external transcoder.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

use super::error::BackendError;
use super::traits::{ExportSession, NativeBackend};
use crate::converter::{locate_ffmpeg, locate_ffprobe, probe_duration, ConverterConfig};
use crate::converter::{FileType, QualityPreset};
use crate::progress::{EstimatorConfig, ProgressEstimator};
use crate::supervisor::{
    CancelSignal, DiagnosticSample, ProcessSupervisor, TranscodeInvocation, Transcoder,
};

/// Containers each preset can write.
pub fn preset_file_types(preset: QualityPreset) -> &'static [FileType] {
    use FileType::*;
    match preset {
        QualityPreset::Passthrough => &[QuickTime, Mpeg4, AppleM4v, AppleM4a, Wave, Aiff],
        QualityPreset::HighestQuality => &[QuickTime, Mpeg4, AppleM4v, Wave, Aiff],
        QualityPreset::MediumQuality | QualityPreset::LowQuality => {
            &[QuickTime, Mpeg4, AppleM4v]
        }
        QualityPreset::AppleM4a => &[AppleM4a],
    }
}

fn codec_args(preset: QualityPreset, file_type: FileType) -> &'static [&'static str] {
    match (preset, file_type) {
        (_, FileType::Wave) => &["-vn", "-c:a", "pcm_s16le"],
        (_, FileType::Aiff) => &["-vn", "-c:a", "pcm_s16be"],
        (QualityPreset::AppleM4a, _) => &["-vn", "-c:a", "aac", "-b:a", "256k", "-f", "ipod"],
        (QualityPreset::Passthrough, FileType::AppleM4a) => &["-vn", "-c:a", "copy", "-f", "ipod"],
        (QualityPreset::Passthrough, _) => &["-c", "copy"],
        (QualityPreset::HighestQuality, _) => &[
            "-c:v", "libx264", "-crf", "18", "-preset", "slow", "-c:a", "aac", "-b:a", "256k",
        ],
        (QualityPreset::MediumQuality, _) => &[
            "-c:v", "libx264", "-crf", "23", "-preset", "medium", "-c:a", "aac", "-b:a", "192k",
        ],
        (QualityPreset::LowQuality, _) => &[
            "-c:v", "libx264", "-crf", "28", "-preset", "fast", "-c:a", "aac", "-b:a", "128k",
        ],
    }
}

/// Native backend built on the process supervisor.
pub struct FfmpegExportBackend {
    config: ConverterConfig,
    estimator: EstimatorConfig,
    transcoder: Arc<dyn Transcoder>,
}

impl FfmpegExportBackend {
    /// Creates a backend that launches real ffmpeg processes.
    pub fn new(config: ConverterConfig) -> Self {
        let transcoder = Arc::new(ProcessSupervisor::from_config(&config));
        Self::with_transcoder(config, transcoder)
    }

    /// Creates a backend driving the given transcoder.
    pub fn with_transcoder(config: ConverterConfig, transcoder: Arc<dyn Transcoder>) -> Self {
        Self {
            config,
            estimator: EstimatorConfig::default(),
            transcoder,
        }
    }

    /// Sets the progress estimation policy used by sessions.
    pub fn with_estimator(mut self, estimator: EstimatorConfig) -> Self {
        self.estimator = estimator;
        self
    }
}

impl NativeBackend for FfmpegExportBackend {
    fn name(&self) -> &str {
        "ffmpeg-export"
    }

    fn create_session(
        &self,
        source: &Path,
        preset: QualityPreset,
    ) -> Option<Arc<dyn ExportSession>> {
        Some(Arc::new(FfmpegExportSession {
            source: source.to_path_buf(),
            preset,
            config: self.config.clone(),
            estimator: self.estimator.clone(),
            transcoder: Arc::clone(&self.transcoder),
            progress: Arc::new(AtomicU64::new(0f64.to_bits())),
            cancel: CancelSignal::new(),
        }))
    }
}

/// One preset-driven export.
pub struct FfmpegExportSession {
    source: PathBuf,
    preset: QualityPreset,
    config: ConverterConfig,
    estimator: EstimatorConfig,
    transcoder: Arc<dyn Transcoder>,
    progress: Arc<AtomicU64>,
    cancel: CancelSignal,
}

#[async_trait]
impl ExportSession for FfmpegExportSession {
    fn preset(&self) -> QualityPreset {
        self.preset
    }

    fn supported_file_types(&self) -> &[FileType] {
        preset_file_types(self.preset)
    }

    fn progress(&self) -> f64 {
        f64::from_bits(self.progress.load(Ordering::Acquire))
    }

    fn cancel(&self) {
        self.cancel.cancel();
    }

    async fn export(&self, destination: &Path, file_type: FileType) -> Result<(), BackendError> {
        if !self.supported_file_types().contains(&file_type) {
            return Err(BackendError::UnsupportedFileType {
                preset: self.preset,
                file_type,
            });
        }

        let program = locate_ffmpeg(&self.config).ok_or(BackendError::Unavailable)?;
        let hint = match (self.config.probe_duration, locate_ffprobe(&self.config)) {
            (true, Some(ffprobe)) => probe_duration(&ffprobe, &self.source).await,
            _ => None,
        };

        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            self.source.to_string_lossy().to_string(),
        ];
        args.extend(codec_args(self.preset, file_type).iter().map(|s| s.to_string()));
        args.push(destination.to_string_lossy().to_string());

        info!(
            "Exporting {} with preset {}",
            self.source.display(),
            self.preset.as_str()
        );

        let progress = Arc::clone(&self.progress);
        let mut estimator = ProgressEstimator::new(self.estimator.clone(), hint);
        let mut sink = move |sample: &DiagnosticSample| {
            if let (None, Some(total)) = (estimator.known_total(), sample.total) {
                estimator.set_known_total(total);
            }
            if let Some(elapsed) = sample.elapsed {
                store_max(&progress, estimator.observe(elapsed));
            }
        };

        let exit = self
            .transcoder
            .run(
                TranscodeInvocation::new(program, args, hint),
                &mut sink,
                self.cancel.clone(),
            )
            .await;

        if exit.success() {
            store_max(&self.progress, 1.0);
            return Ok(());
        }
        if self.cancel.is_cancelled() {
            debug!("Export of {} cancelled", self.source.display());
            return Err(BackendError::Cancelled);
        }
        let reason = if exit.launch_failed() {
            "encoder could not be started".to_string()
        } else {
            format!("encoder exited with code {}", exit.code)
        };
        Err(BackendError::ExportFailed {
            reason,
            log_path: exit.log_path,
        })
    }
}

fn store_max(cell: &AtomicU64, value: f64) {
    let _ = cell.fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
        (value > f64::from_bits(bits)).then(|| value.to_bits())
    });
}
