//! Types for the supervisor module.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Exit code reported when the transcoder could not be started at all.
pub const LAUNCH_FAILURE_CODE: i32 = -1;

/// What to run.
#[derive(Debug, Clone, PartialEq)]
pub struct TranscodeInvocation {
    /// Transcoder executable.
    pub program: PathBuf,
    /// Full argument vector.
    pub args: Vec<String>,
    /// Total duration known before launch, in seconds.
    pub duration_hint: Option<f64>,
}

impl TranscodeInvocation {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, duration_hint: Option<f64>) -> Self {
        Self {
            program: program.into(),
            args,
            duration_hint,
        }
    }
}

/// One complete diagnostic line with whatever could be parsed from it.
#[derive(Debug, Clone, PartialEq)]
pub struct DiagnosticSample {
    /// The raw line, without its terminator.
    pub line: String,
    /// Elapsed position from a `time=` token, in seconds.
    pub elapsed: Option<f64>,
    /// Total duration known when this line was read.
    pub total: Option<f64>,
}

/// How a supervised process ended.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessExit {
    /// Exit code, or [`LAUNCH_FAILURE_CODE`].
    pub code: i32,
    /// Diagnostic log for this invocation, when one could be created.
    pub log_path: Option<PathBuf>,
    /// Total duration as last known.
    pub total_duration: Option<f64>,
}

impl ProcessExit {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    pub fn launch_failed(&self) -> bool {
        self.code == LAUNCH_FAILURE_CODE
    }
}

/// Cooperative, sticky cancellation request shared between a job and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    requested: Arc<AtomicBool>,
    notify: Arc<Notify>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_cancelled(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Resolves once cancellation has been requested.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
