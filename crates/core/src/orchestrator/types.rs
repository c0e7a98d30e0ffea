//! Types for the conversion orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::converter::{ConversionError, ConversionStrategy, TargetFormat};

/// Reasons a request is refused without touching the current job.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum OrchestratorError {
    /// Another conversion is preparing or running.
    #[error("a conversion is already in progress")]
    AlreadyRunning,

    /// There is no overwrite decision waiting to be resolved.
    #[error("no destination decision is pending")]
    NoPendingDecision,
}

/// Lifecycle of the current job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    #[default]
    Idle,
    Preparing,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Preparing => "preparing",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The observable surface of a job: state, completion and a status line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    pub state: JobState,
    /// Completion in `[0, 1]`.
    pub progress: f64,
    pub status: String,
}

/// What happened during one conversion attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    pub source: PathBuf,
    pub target: TargetFormat,
    pub strategy: ConversionStrategy,
    /// Output path, once one was resolved.
    pub destination: Option<PathBuf>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Diagnostic log of the external transcoder, if one ran.
    pub log_path: Option<PathBuf>,
    /// Media duration in seconds as reported by the transcoder.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_duration: Option<f64>,
}

impl JobReport {
    /// Wall-clock time between start and finish.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// File name of the destination, for status text.
    pub fn file_name(&self) -> Option<String> {
        self.destination
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
    }
}

/// Terminal result of [`super::ConversionOrchestrator::convert`].
#[derive(Debug)]
pub enum ConversionOutcome {
    /// The output was written.
    Succeeded(JobReport),
    /// The job failed; `report.log_path` points at diagnostics when present.
    Failed {
        error: ConversionError,
        report: JobReport,
    },
    /// Cancellation was requested and the encoder stopped.
    Cancelled(JobReport),
    /// The requested destination exists. Nothing was started; settle it with
    /// [`super::ConversionOrchestrator::resolve_pending`].
    NeedsDecision { existing: PathBuf },
    /// The pending decision was resolved with `Abandon`.
    Abandoned,
}

impl ConversionOutcome {
    /// Terminal job state, if the attempt ran.
    pub fn state(&self) -> Option<JobState> {
        match self {
            Self::Succeeded(_) => Some(JobState::Succeeded),
            Self::Failed { .. } => Some(JobState::Failed),
            Self::Cancelled(_) => Some(JobState::Cancelled),
            Self::NeedsDecision { .. } | Self::Abandoned => None,
        }
    }

    pub fn report(&self) -> Option<&JobReport> {
        match self {
            Self::Succeeded(report) | Self::Cancelled(report) => Some(report),
            Self::Failed { report, .. } => Some(report),
            Self::NeedsDecision { .. } | Self::Abandoned => None,
        }
    }

    /// Diagnostic log to surface on failure.
    pub fn log_path(&self) -> Option<&Path> {
        match self {
            Self::Failed { error, report } => error
                .log_path()
                .map(PathBuf::as_path)
                .or(report.log_path.as_deref()),
            _ => None,
        }
    }
}
