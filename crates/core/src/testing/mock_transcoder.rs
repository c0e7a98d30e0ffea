//! Mock transcoder for testing.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::supervisor::{
    parse_duration_marker, parse_elapsed_marker, CancelSignal, DiagnosticSample, ProcessExit,
    SampleSink, TranscodeInvocation, Transcoder, LAUNCH_FAILURE_CODE,
};

#[derive(Debug, Clone)]
struct ScriptedLine {
    delay: Duration,
    line: String,
}

/// Mock implementation of the Transcoder trait.
///
/// Plays back a script of diagnostic lines instead of running a process:
/// - Lines are parsed with the same markers the real supervisor uses
/// - Exit code and the exit code produced by an interrupt are configurable
/// - Can hold the "process" open until cancellation arrives
/// - Records every invocation for assertions
///
/// # Example
///
/// ```rust,ignore
/// use convertbot_core::testing::MockTranscoder;
///
/// let transcoder = MockTranscoder::new()
///     .with_line(Duration::ZERO, "Duration: 00:00:10.00, start: 0")
///     .with_line(Duration::from_millis(10), "time=00:00:05.00")
///     .with_exit_code(0);
///
/// let invocations = transcoder.invocations().await;
/// ```
#[derive(Debug, Clone)]
pub struct MockTranscoder {
    script: Vec<ScriptedLine>,
    exit_code: i32,
    cancel_exit_code: i32,
    hold_until_cancelled: bool,
    log_path: PathBuf,
    /// Recorded invocations.
    invocations: Arc<RwLock<Vec<TranscodeInvocation>>>,
}

impl Default for MockTranscoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTranscoder {
    /// Create a mock that exits 0 without output.
    pub fn new() -> Self {
        Self {
            script: Vec::new(),
            exit_code: 0,
            cancel_exit_code: 255,
            hold_until_cancelled: false,
            log_path: std::env::temp_dir().join("ffmpeg-mock.log"),
            invocations: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Append a diagnostic line emitted after `delay`.
    pub fn with_line(mut self, delay: Duration, line: impl Into<String>) -> Self {
        self.script.push(ScriptedLine {
            delay,
            line: line.into(),
        });
        self
    }

    /// Set the exit code reported when the script finishes.
    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = code;
        self
    }

    /// Set the exit code reported after an interrupt.
    pub fn with_cancel_exit_code(mut self, code: i32) -> Self {
        self.cancel_exit_code = code;
        self
    }

    /// Keep running after the script until cancellation is requested.
    pub fn hold_until_cancelled(mut self) -> Self {
        self.hold_until_cancelled = true;
        self
    }

    /// Set the log path reported with the exit.
    pub fn with_log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = path.into();
        self
    }

    /// Get all recorded invocations.
    pub async fn invocations(&self) -> Vec<TranscodeInvocation> {
        self.invocations.read().await.clone()
    }

    /// Get the number of runs performed.
    pub async fn run_count(&self) -> usize {
        self.invocations.read().await.len()
    }

    fn exit(&self, code: i32, total_duration: Option<f64>) -> ProcessExit {
        ProcessExit {
            code,
            log_path: Some(self.log_path.clone()),
            total_duration,
        }
    }
}

#[async_trait]
impl Transcoder for MockTranscoder {
    fn name(&self) -> &str {
        "mock"
    }

    async fn run(
        &self,
        invocation: TranscodeInvocation,
        sink: &mut dyn SampleSink,
        cancel: CancelSignal,
    ) -> ProcessExit {
        let mut total = invocation.duration_hint;
        self.invocations.write().await.push(invocation);

        if self.exit_code == LAUNCH_FAILURE_CODE {
            return self.exit(LAUNCH_FAILURE_CODE, total);
        }

        for step in &self.script {
            if !step.delay.is_zero() {
                tokio::select! {
                    _ = tokio::time::sleep(step.delay) => {}
                    _ = cancel.cancelled() => return self.exit(self.cancel_exit_code, total),
                }
            }
            if cancel.is_cancelled() {
                return self.exit(self.cancel_exit_code, total);
            }
            if total.is_none() {
                total = parse_duration_marker(&step.line);
            }
            sink.on_sample(&DiagnosticSample {
                line: step.line.clone(),
                elapsed: parse_elapsed_marker(&step.line),
                total,
            });
        }

        if self.hold_until_cancelled {
            cancel.cancelled().await;
        }
        if cancel.is_cancelled() {
            return self.exit(self.cancel_exit_code, total);
        }
        self.exit(self.exit_code, total)
    }
}
