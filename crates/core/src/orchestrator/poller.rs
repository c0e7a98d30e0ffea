//! Periodic progress polling for native export sessions.

use std::path::Path;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use crate::backend::{BackendError, ExportSession};
use crate::converter::FileType;
use crate::supervisor::CancelSignal;

/// Runs an export to completion, sampling its progress every `interval`.
///
/// The ticker lives only as long as this future, so polling stops as soon as
/// the export resolves. A cancellation request is forwarded to the session
/// once; the export is still awaited until the backend honors it.
pub(crate) async fn poll_export<F>(
    session: &dyn ExportSession,
    destination: &Path,
    file_type: FileType,
    interval: Duration,
    cancel: &CancelSignal,
    mut on_progress: F,
) -> Result<(), BackendError>
where
    F: FnMut(f64),
{
    let export = session.export(destination, file_type);
    tokio::pin!(export);

    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cancel_forwarded = false;

    loop {
        tokio::select! {
            result = &mut export => return result,
            _ = ticker.tick() => on_progress(session.progress()),
            _ = cancel.cancelled(), if !cancel_forwarded => {
                debug!("Forwarding cancellation to {} export", session.preset().as_str());
                cancel_forwarded = true;
                session.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::NativeBackend;
    use crate::converter::QualityPreset;
    use crate::testing::MockNativeBackend;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_poll_reports_increasing_progress() {
        let temp = TempDir::new().unwrap();
        let backend = MockNativeBackend::new()
            .with_progress_steps(vec![0.2, 0.4, 0.6, 0.8], Duration::from_millis(20));
        let session = backend
            .create_session(Path::new("/media/clip.mov"), QualityPreset::Passthrough)
            .unwrap();

        let mut samples = Vec::new();
        poll_export(
            session.as_ref(),
            &temp.path().join("clip.mp4"),
            FileType::Mpeg4,
            Duration::from_millis(5),
            &CancelSignal::new(),
            |p| samples.push(p),
        )
        .await
        .unwrap();

        assert!(!samples.is_empty());
        assert!(samples.windows(2).all(|w| w[0] <= w[1]));
    }

    #[tokio::test]
    async fn test_poll_forwards_cancel() {
        let temp = TempDir::new().unwrap();
        let backend = MockNativeBackend::new().hold_until_cancelled();
        let session = backend
            .create_session(Path::new("/media/clip.mov"), QualityPreset::Passthrough)
            .unwrap();
        let cancel = CancelSignal::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            trigger.cancel();
        });

        let result = poll_export(
            session.as_ref(),
            &temp.path().join("clip.mp4"),
            FileType::Mpeg4,
            Duration::from_millis(5),
            &cancel,
            |_| {},
        )
        .await;
        assert!(matches!(result, Err(BackendError::Cancelled)));
    }
}
