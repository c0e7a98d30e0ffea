//! Trait definitions for the supervisor module.

use async_trait::async_trait;

use super::types::{CancelSignal, DiagnosticSample, ProcessExit, TranscodeInvocation};

/// Consumer of diagnostic samples.
///
/// Called once per complete line, in stream order, never on the reader task.
pub trait SampleSink: Send {
    fn on_sample(&mut self, sample: &DiagnosticSample);
}

impl<F> SampleSink for F
where
    F: FnMut(&DiagnosticSample) + Send,
{
    fn on_sample(&mut self, sample: &DiagnosticSample) {
        self(sample)
    }
}

/// Something that runs an external transcoder to completion.
#[async_trait]
pub trait Transcoder: Send + Sync {
    /// Returns the name of this transcoder implementation.
    fn name(&self) -> &str;

    /// Runs the invocation, feeding `sink` until the process exits.
    ///
    /// Never fails: a process that cannot be started resolves to
    /// [`super::LAUNCH_FAILURE_CODE`]. Once `cancel` fires an interrupt is
    /// delivered and the run keeps waiting for the real exit.
    async fn run(
        &self,
        invocation: TranscodeInvocation,
        sink: &mut dyn SampleSink,
        cancel: CancelSignal,
    ) -> ProcessExit;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTranscoder;

    #[async_trait]
    impl Transcoder for EchoTranscoder {
        fn name(&self) -> &str {
            "echo"
        }

        async fn run(
            &self,
            invocation: TranscodeInvocation,
            sink: &mut dyn SampleSink,
            _cancel: CancelSignal,
        ) -> ProcessExit {
            for arg in &invocation.args {
                sink.on_sample(&DiagnosticSample {
                    line: arg.clone(),
                    elapsed: None,
                    total: invocation.duration_hint,
                });
            }
            ProcessExit {
                code: 0,
                log_path: None,
                total_duration: invocation.duration_hint,
            }
        }
    }

    #[tokio::test]
    async fn test_closure_sink() {
        let mut seen = Vec::new();
        let mut sink = |sample: &DiagnosticSample| seen.push(sample.line.clone());
        let exit = EchoTranscoder
            .run(
                TranscodeInvocation::new("echo", vec!["a".into(), "b".into()], Some(3.0)),
                &mut sink,
                CancelSignal::new(),
            )
            .await;
        assert!(exit.success());
        assert_eq!(seen, vec!["a", "b"]);
    }
}
