//! Completion estimation from elapsed-time samples.
//!
//! Transcoders only report how far they have got, and announce the total
//! duration late or not at all. The estimator turns that into a fraction that
//! never claims completion before the process has actually exited.

mod config;
mod estimator;

pub use config::EstimatorConfig;
pub use estimator::ProgressEstimator;
