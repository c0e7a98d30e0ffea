//! Conversion orchestrator implementation.
//!
//! Drives one job at a time through `Preparing -> Running -> terminal`:
//! - Destination: resolved (or parked as a pending decision) before any encoder starts
//! - Native: export session picked by preset capability, progress polled
//! - External: transcoder supervised, progress estimated from its diagnostics

use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{watch, Mutex};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::backend::{BackendError, NativeBackend};
use crate::config::Config;
use crate::converter::{
    build_external_args, ffmpeg_available, locate_ffmpeg, locate_ffprobe, probe_duration,
    ConversionError, ConversionRequest, ConversionStrategy, ConverterConfig, TargetFormat,
};
use crate::destination::{DestinationResolver, OverwriteDecision, Resolution};
use crate::metrics;
use crate::progress::{EstimatorConfig, ProgressEstimator};
use crate::supervisor::{
    CancelSignal, DiagnosticSample, TranscodeInvocation, Transcoder, LAUNCH_FAILURE_CODE,
};
use crate::timecode::format_timecode;

use super::config::OrchestratorConfig;
use super::poller::poll_export;
use super::reporter::ProgressReporter;
use super::types::{ConversionOutcome, JobReport, JobState, OrchestratorError, ProgressUpdate};

/// A request parked until the caller settles an existing destination.
#[derive(Debug, Clone)]
struct PendingDecision {
    request: ConversionRequest,
    existing: PathBuf,
}

/// How an encoder run ended, before it is turned into an outcome.
enum JobEnd {
    Completed {
        log_path: Option<PathBuf>,
        media_duration: Option<f64>,
    },
    Cancelled { log_path: Option<PathBuf> },
    Failed(ConversionError),
}

/// Clears the busy flag when the job that set it goes away.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Runs single conversions, exposing progress and cancellation.
pub struct ConversionOrchestrator {
    config: OrchestratorConfig,
    converter: ConverterConfig,
    estimator: EstimatorConfig,
    resolver: DestinationResolver,
    backend: Arc<dyn NativeBackend>,
    transcoder: Arc<dyn Transcoder>,

    // Runtime state
    busy: AtomicBool,
    pending: Mutex<Option<PendingDecision>>,
    active: Mutex<Option<CancelSignal>>,
    reporter: ProgressReporter,
}

impl ConversionOrchestrator {
    /// Create a new orchestrator.
    pub fn new(
        config: &Config,
        backend: Arc<dyn NativeBackend>,
        transcoder: Arc<dyn Transcoder>,
    ) -> Self {
        Self {
            config: config.orchestrator.clone(),
            converter: config.converter.clone(),
            estimator: config.progress.clone(),
            resolver: DestinationResolver::new(config.destination.clone()),
            backend,
            transcoder,
            busy: AtomicBool::new(false),
            pending: Mutex::new(None),
            active: Mutex::new(None),
            reporter: ProgressReporter::new(),
        }
    }

    /// Watch the `(state, progress, status)` triple.
    pub fn subscribe(&self) -> watch::Receiver<ProgressUpdate> {
        self.reporter.subscribe()
    }

    /// Current job state.
    pub fn state(&self) -> JobState {
        self.reporter.current().state
    }

    /// Latest published progress.
    pub fn progress(&self) -> ProgressUpdate {
        self.reporter.current()
    }

    /// Whether the external transcoder can be found.
    pub fn ffmpeg_available(&self) -> bool {
        ffmpeg_available(&self.converter)
    }

    /// The destination waiting for a decision, if any.
    pub async fn pending_decision(&self) -> Option<PathBuf> {
        self.pending.lock().await.as_ref().map(|p| p.existing.clone())
    }

    /// Requests cancellation of the running job.
    ///
    /// Returns `false` when nothing is running. The job still ends only when
    /// the encoder honors the request.
    pub async fn cancel(&self) -> bool {
        match self.active.lock().await.as_ref() {
            Some(signal) => {
                info!("Cancellation requested");
                signal.cancel();
                true
            }
            None => false,
        }
    }

    /// Runs a conversion to a terminal outcome.
    ///
    /// Fails fast with [`OrchestratorError::AlreadyRunning`] while another job
    /// is active. When the requested destination exists and overwriting was
    /// not pre-authorized, returns [`ConversionOutcome::NeedsDecision`]
    /// without starting anything; a later `convert` discards that decision.
    pub async fn convert(
        &self,
        request: ConversionRequest,
    ) -> Result<ConversionOutcome, OrchestratorError> {
        let _guard = self.try_begin()?;

        if let Some(stale) = self.pending.lock().await.take() {
            debug!(
                "Discarding pending decision for {}",
                stale.existing.display()
            );
        }

        let started_at = Utc::now();
        self.reporter.begin_preparing(preparing_status(request.target));

        let resolution = self
            .resolver
            .resolve(
                request.destination.as_deref(),
                &request.source,
                request.target.extension(),
                request.allow_overwrite,
            )
            .await;

        match resolution {
            Ok(Resolution::Ready(destination)) => {
                Ok(self.execute(request, destination, started_at).await)
            }
            Ok(Resolution::NeedsDecision(existing)) => {
                info!("{} already exists, waiting for a decision", existing.display());
                *self.pending.lock().await = Some(PendingDecision {
                    request,
                    existing: existing.clone(),
                });
                self.reporter.set_state(JobState::Idle, "");
                Ok(ConversionOutcome::NeedsDecision { existing })
            }
            Err(e) => Ok(self.fail(&request, None, started_at, e.into())),
        }
    }

    /// Settles the pending destination decision and runs the parked request.
    pub async fn resolve_pending(
        &self,
        decision: OverwriteDecision,
    ) -> Result<ConversionOutcome, OrchestratorError> {
        let _guard = self.try_begin()?;
        let pending = self
            .pending
            .lock()
            .await
            .take()
            .ok_or(OrchestratorError::NoPendingDecision)?;
        let PendingDecision { request, existing } = pending;

        info!("Resolving {} with {:?}", existing.display(), decision);
        let started_at = Utc::now();
        self.reporter.begin_preparing(preparing_status(request.target));

        match self
            .resolver
            .apply_decision(&existing, request.target.extension(), decision)
            .await
        {
            Ok(Some(destination)) => Ok(self.execute(request, destination, started_at).await),
            Ok(None) => {
                self.reporter.set_state(JobState::Idle, "");
                Ok(ConversionOutcome::Abandoned)
            }
            Err(e) => Ok(self.fail(&request, Some(existing), started_at, e.into())),
        }
    }

    fn try_begin(&self) -> Result<BusyGuard<'_>, OrchestratorError> {
        if self
            .busy
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Rejecting conversion request, a job is already active");
            metrics::REJECTED_REQUESTS.inc();
            return Err(OrchestratorError::AlreadyRunning);
        }
        Ok(BusyGuard(&self.busy))
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.config.poll_interval_ms.max(1))
    }

    async fn execute(
        &self,
        request: ConversionRequest,
        destination: PathBuf,
        started_at: chrono::DateTime<Utc>,
    ) -> ConversionOutcome {
        let strategy = request.target.strategy();
        info!(
            "Converting {} to {} via {} strategy",
            request.source.display(),
            destination.display(),
            strategy.as_str()
        );

        let cancel = CancelSignal::new();
        *self.active.lock().await = Some(cancel.clone());

        let end = match strategy {
            ConversionStrategy::NativeBackend => {
                self.run_native(&request, &destination, &cancel).await
            }
            ConversionStrategy::ExternalProcess => {
                self.run_external(&request, &destination, &cancel).await
            }
        };

        self.active.lock().await.take();

        let mut report = JobReport {
            source: request.source.clone(),
            target: request.target,
            strategy,
            destination: Some(destination),
            started_at,
            finished_at: Utc::now(),
            log_path: None,
            media_duration: None,
        };
        record_duration(&report);

        match end {
            JobEnd::Completed {
                log_path,
                media_duration,
            } => {
                report.log_path = log_path;
                report.media_duration = media_duration;
                let name = report.file_name().unwrap_or_default();
                info!("Conversion finished: {}", name);
                self.reporter
                    .finish(JobState::Succeeded, format!("Saved to {}", name));
                record_outcome(strategy, JobState::Succeeded);
                ConversionOutcome::Succeeded(report)
            }
            JobEnd::Cancelled { log_path } => {
                report.log_path = log_path;
                info!("Conversion cancelled");
                self.reporter.finish(JobState::Cancelled, "Cancelled.");
                record_outcome(strategy, JobState::Cancelled);
                ConversionOutcome::Cancelled(report)
            }
            JobEnd::Failed(error) => {
                report.log_path = error.log_path().cloned();
                warn!("Conversion failed: {}", error);
                self.reporter.finish(JobState::Failed, "Failed.");
                record_outcome(strategy, JobState::Failed);
                record_failure(&error);
                ConversionOutcome::Failed { error, report }
            }
        }
    }

    fn fail(
        &self,
        request: &ConversionRequest,
        destination: Option<PathBuf>,
        started_at: chrono::DateTime<Utc>,
        error: ConversionError,
    ) -> ConversionOutcome {
        warn!("Conversion failed before starting: {}", error);
        let strategy = request.target.strategy();
        self.reporter.finish(JobState::Failed, "Failed.");
        record_outcome(strategy, JobState::Failed);
        record_failure(&error);
        ConversionOutcome::Failed {
            error,
            report: JobReport {
                source: request.source.clone(),
                target: request.target,
                strategy,
                destination,
                started_at,
                finished_at: Utc::now(),
                log_path: None,
                media_duration: None,
            },
        }
    }

    async fn run_native(
        &self,
        request: &ConversionRequest,
        destination: &Path,
        cancel: &CancelSignal,
    ) -> JobEnd {
        let Some(file_type) = request.target.file_type() else {
            return JobEnd::Failed(ConversionError::NoCompatibleEncoder);
        };
        let presets = request
            .target
            .native_presets(request.compress, request.quality_preset);

        let session = presets.iter().find_map(|preset| {
            self.backend
                .create_session(&request.source, *preset)
                .filter(|s| s.supported_file_types().contains(&file_type))
        });
        let Some(session) = session else {
            return JobEnd::Failed(ConversionError::NoCompatibleEncoder);
        };

        debug!(
            "Exporting with {} preset {}",
            self.backend.name(),
            session.preset().as_str()
        );
        self.reporter.begin_running(native_status(request.target));

        let result = poll_export(
            session.as_ref(),
            destination,
            file_type,
            self.poll_interval(),
            cancel,
            |fraction| self.reporter.advance(fraction, None),
        )
        .await;

        match result {
            Ok(()) => JobEnd::Completed {
                log_path: None,
                media_duration: None,
            },
            Err(BackendError::Cancelled) => JobEnd::Cancelled { log_path: None },
            Err(e) if cancel.is_cancelled() => {
                debug!("Export ended after cancellation: {}", e);
                JobEnd::Cancelled {
                    log_path: e.log_path().cloned(),
                }
            }
            Err(e) => JobEnd::Failed(e.into()),
        }
    }

    async fn run_external(
        &self,
        request: &ConversionRequest,
        destination: &Path,
        cancel: &CancelSignal,
    ) -> JobEnd {
        let Some(program) = locate_ffmpeg(&self.converter) else {
            return JobEnd::Failed(ConversionError::BackendUnavailable);
        };
        let Some(args) = build_external_args(request.target, &request.source, destination)
        else {
            return JobEnd::Failed(ConversionError::NoCompatibleEncoder);
        };

        let hint = match (self.converter.probe_duration, locate_ffprobe(&self.converter)) {
            (true, Some(ffprobe)) => probe_duration(&ffprobe, &request.source).await,
            _ => None,
        };

        let name = request.target.display_name();
        self.reporter
            .begin_running(format!("Converting to {} via FFmpeg...", name));
        debug!(
            "Handing {} to the {} transcoder",
            request.source.display(),
            self.transcoder.name()
        );

        let started = Instant::now();
        let estimator =
            std::sync::Mutex::new(ProgressEstimator::new(self.estimator.clone(), hint));
        let reporter = &self.reporter;
        let mut sink = |sample: &DiagnosticSample| {
            let Ok(mut estimator) = estimator.lock() else {
                return;
            };
            if let (None, Some(total)) = (estimator.known_total(), sample.total) {
                estimator.set_known_total(total);
            }
            match sample.elapsed {
                Some(elapsed) => {
                    let fraction = estimator.observe(elapsed);
                    let status = match estimator.known_total() {
                        Some(total) => format!(
                            "Converting {} - {} / {}",
                            name,
                            format_timecode(elapsed),
                            format_timecode(total)
                        ),
                        None => format!("Converting {} - time {}", name, format_timecode(elapsed)),
                    };
                    reporter.advance(fraction, Some(status));
                }
                None => {
                    let fraction = estimator.idle_fraction(started.elapsed()).unwrap_or(0.0);
                    reporter.advance(fraction, Some(sample.line.clone()));
                }
            }
        };

        let run = self.transcoder.run(
            TranscodeInvocation::new(program.clone(), args, hint),
            &mut sink,
            cancel.clone(),
        );
        tokio::pin!(run);

        // Wall-clock motion until the transcoder reports its first elapsed time.
        let mut ticker = tokio::time::interval(self.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut idle = true;
        let exit = loop {
            tokio::select! {
                exit = &mut run => break exit,
                _ = ticker.tick(), if idle => {
                    let fraction = estimator
                        .lock()
                        .ok()
                        .and_then(|e| e.idle_fraction(started.elapsed()));
                    match fraction {
                        Some(fraction) => reporter.advance(fraction, None),
                        None => idle = false,
                    }
                }
            }
        };

        match exit.code {
            0 => JobEnd::Completed {
                log_path: exit.log_path,
                media_duration: exit.total_duration,
            },
            LAUNCH_FAILURE_CODE => JobEnd::Failed(ConversionError::LaunchFailure {
                program,
                log_path: exit.log_path,
            }),
            _ if cancel.is_cancelled() => JobEnd::Cancelled {
                log_path: exit.log_path,
            },
            code => JobEnd::Failed(ConversionError::ProcessFailure {
                code,
                log_path: exit.log_path,
            }),
        }
    }
}

fn preparing_status(target: TargetFormat) -> &'static str {
    if target.is_audio() {
        "Preparing audio..."
    } else {
        "Preparing video..."
    }
}

fn native_status(target: TargetFormat) -> &'static str {
    if target.is_audio() {
        "Converting audio..."
    } else {
        "Converting video..."
    }
}

fn record_outcome(strategy: ConversionStrategy, state: JobState) {
    metrics::CONVERSIONS_TOTAL
        .with_label_values(&[strategy.as_str(), state.as_str()])
        .inc();
}

fn record_failure(error: &ConversionError) {
    metrics::CONVERSION_FAILURES
        .with_label_values(&[error.kind()])
        .inc();
}

fn record_duration(report: &JobReport) {
    let secs = report.elapsed().num_milliseconds() as f64 / 1000.0;
    metrics::CONVERSION_DURATION
        .with_label_values(&[report.strategy.as_str()])
        .observe(secs.max(0.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{AudioFormat, VideoFormat};

    #[test]
    fn test_status_text_by_kind() {
        assert_eq!(
            preparing_status(TargetFormat::Audio(AudioFormat::Wav)),
            "Preparing audio..."
        );
        assert_eq!(
            preparing_status(TargetFormat::Video(VideoFormat::Mkv)),
            "Preparing video..."
        );
        assert_eq!(
            native_status(TargetFormat::Video(VideoFormat::Mp4)),
            "Converting video..."
        );
    }
}
