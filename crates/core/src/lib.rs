//! Conversion orchestration engine.
//!
//! Converts one media file at a time between containers, either through a
//! native export backend or a supervised external transcoder, and reports a
//! single `(progress, status)` pair with cancellation support.

pub mod backend;
pub mod config;
pub mod converter;
pub mod destination;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod supervisor;
pub mod testing;
pub mod timecode;

pub use backend::{BackendError, ExportSession, FfmpegExportBackend, NativeBackend};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config, ConfigError,
};
pub use converter::{
    ffmpeg_available, locate_ffmpeg, locate_ffprobe, AudioFormat, ConversionError,
    ConversionRequest, ConversionStrategy, ConverterConfig, FileType, QualityPreset, TargetFormat,
    VideoFormat,
};
pub use destination::{
    DestinationConfig, DestinationError, DestinationResolver, OverwriteDecision, Resolution,
};
pub use orchestrator::{
    ConversionOrchestrator, ConversionOutcome, JobReport, JobState, OrchestratorConfig,
    OrchestratorError, ProgressUpdate,
};
pub use progress::{EstimatorConfig, ProgressEstimator};
pub use supervisor::{
    CancelSignal, DiagnosticSample, ProcessExit, ProcessSupervisor, SampleSink,
    TranscodeInvocation, Transcoder,
};
pub use timecode::{format_timecode, parse_timecode, TimecodeError};
