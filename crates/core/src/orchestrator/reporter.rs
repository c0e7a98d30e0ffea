//! Single-writer publication of job progress.

use tokio::sync::watch;

use super::types::{JobState, ProgressUpdate};

/// Owns the `(state, progress, status)` channel.
///
/// Only the job holding the orchestrator's busy flag writes through this, so
/// the rules below hold without further locking: progress never decreases
/// while running, resets to zero when a job starts running, becomes exactly
/// 1.0 on success and is left untouched on failure or cancellation.
#[derive(Debug)]
pub(crate) struct ProgressReporter {
    tx: watch::Sender<ProgressUpdate>,
}

impl ProgressReporter {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(ProgressUpdate::default());
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<ProgressUpdate> {
        self.tx.subscribe()
    }

    pub(crate) fn current(&self) -> ProgressUpdate {
        self.tx.borrow().clone()
    }

    /// Moves to a non-running state without touching progress.
    pub(crate) fn set_state(&self, state: JobState, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|update| {
            update.state = state;
            update.status = status;
        });
    }

    /// Starts a new job: the previous job's progress does not carry over.
    pub(crate) fn begin_preparing(&self, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|update| {
            update.state = JobState::Preparing;
            update.progress = 0.0;
            update.status = status;
        });
    }

    pub(crate) fn begin_running(&self, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|update| {
            update.state = JobState::Running;
            update.progress = 0.0;
            update.status = status;
        });
    }

    /// Raises progress to `fraction` if higher, and replaces the status line
    /// when one is given. Ignored unless running.
    pub(crate) fn advance(&self, fraction: f64, status: Option<String>) {
        self.tx.send_if_modified(|update| {
            if update.state != JobState::Running {
                return false;
            }
            let mut changed = false;
            let fraction = if fraction.is_finite() {
                fraction.clamp(0.0, 1.0)
            } else {
                0.0
            };
            if fraction > update.progress {
                update.progress = fraction;
                changed = true;
            }
            if let Some(status) = status {
                if status != update.status {
                    update.status = status;
                    changed = true;
                }
            }
            changed
        });
    }

    /// Publishes a terminal state.
    pub(crate) fn finish(&self, state: JobState, status: impl Into<String>) {
        let status = status.into();
        self.tx.send_modify(|update| {
            if state == JobState::Succeeded {
                update.progress = 1.0;
            }
            update.state = state;
            update.status = status;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic_while_running() {
        let reporter = ProgressReporter::new();
        reporter.begin_running("Converting");
        reporter.advance(0.4, None);
        reporter.advance(0.2, Some("Converting MP3 - 00:02 / 00:10".to_string()));
        let current = reporter.current();
        assert_eq!(current.progress, 0.4);
        assert_eq!(current.status, "Converting MP3 - 00:02 / 00:10");
    }

    #[test]
    fn test_terminal_states() {
        let reporter = ProgressReporter::new();
        reporter.begin_running("Converting");
        reporter.advance(0.6, None);
        reporter.finish(JobState::Cancelled, "Cancelled.");
        assert_eq!(reporter.current().progress, 0.6);

        reporter.advance(0.9, None);
        assert_eq!(reporter.current().progress, 0.6);

        reporter.set_state(JobState::Idle, "");
        assert_eq!(reporter.current().progress, 0.6);
        reporter.begin_running("Converting video...");
        assert_eq!(reporter.current().progress, 0.0);
        reporter.finish(JobState::Succeeded, "Saved to clip.mp4");
        assert_eq!(reporter.current().progress, 1.0);
    }

    #[test]
    fn test_new_job_starts_from_zero() {
        let reporter = ProgressReporter::new();
        reporter.begin_running("Converting");
        reporter.finish(JobState::Succeeded, "Saved to clip.mp3");

        reporter.begin_preparing("Preparing video...");
        let current = reporter.current();
        assert_eq!(current.state, JobState::Preparing);
        assert_eq!(current.progress, 0.0);

        reporter.finish(JobState::Failed, "Failed.");
        assert_eq!(reporter.current().progress, 0.0);
    }

    #[test]
    fn test_subscribers_see_updates() {
        let reporter = ProgressReporter::new();
        let mut rx = reporter.subscribe();
        reporter.begin_running("Converting");
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().state, JobState::Running);
    }
}
