//! External transcoder process supervision.
//!
//! The supervisor launches the transcoder with its diagnostic stream piped,
//! splits that stream into lines off the caller's path, persists every line
//! to a per-invocation log file, picks up the `Duration:` announcement and
//! `time=` samples, and hands each line to a [`SampleSink`]. Cancellation
//! sends an interrupt; the exit code is whatever the OS reports.
//!
//! # Example
//!
//! ```ignore
//! use convertbot_core::supervisor::{CancelSignal, ProcessSupervisor, TranscodeInvocation, Transcoder};
//!
//! let supervisor = ProcessSupervisor::new(std::env::temp_dir(), 256);
//! let cancel = CancelSignal::new();
//! let mut sink = |sample: &DiagnosticSample| println!("{:?}", sample.elapsed);
//!
//! let exit = supervisor
//!     .run(TranscodeInvocation::new("ffmpeg", args, None), &mut sink, cancel)
//!     .await;
//! println!("exit code {}", exit.code);
//! ```

mod lines;
mod process;
mod traits;
mod types;

pub use lines::{parse_duration_marker, parse_elapsed_marker, LineSplitter};
pub use process::ProcessSupervisor;
pub use traits::{SampleSink, Transcoder};
pub use types::{CancelSignal, DiagnosticSample, ProcessExit, TranscodeInvocation, LAUNCH_FAILURE_CODE};
