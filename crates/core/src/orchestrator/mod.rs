//! Conversion orchestrator.
//!
//! Owns the single-job state machine:
//! - **Preparing**: destination resolved, or parked as a pending decision
//! - **Running**: native export polled, or external transcoder supervised
//! - **Terminal**: `Succeeded` (progress exactly 1.0), `Failed` or `Cancelled`
//!
//! Progress and status text are published on a `watch` channel; only the
//! active job writes to it.

mod config;
mod poller;
mod reporter;
mod runner;
mod types;

pub use config::OrchestratorConfig;
pub use runner::ConversionOrchestrator;
pub use types::{ConversionOutcome, JobReport, JobState, OrchestratorError, ProgressUpdate};
