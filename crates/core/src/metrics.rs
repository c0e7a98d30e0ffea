//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (conversions by strategy and outcome, durations)
//! - Supervisor (diagnostic lines, launch failures)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Conversions total by strategy and outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("convertbot_conversions_total", "Total conversion jobs"),
        &["strategy", "outcome"], // outcome: "succeeded", "failed", "cancelled"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "convertbot_conversion_duration_seconds",
            "Duration of conversion jobs",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
        &["strategy"],
    )
    .unwrap()
});

/// Failed conversions by failure kind.
pub static CONVERSION_FAILURES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertbot_conversion_failures_total",
            "Failed conversion jobs by cause",
        ),
        &["kind"], // see ConversionError::kind
    )
    .unwrap()
});

/// Requests rejected because a job was already running.
pub static REJECTED_REQUESTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "convertbot_rejected_requests_total",
        "Conversion requests rejected while another job was running",
    )
    .unwrap()
});

// =============================================================================
// Supervisor Metrics
// =============================================================================

/// Diagnostic lines read, by whether an elapsed time could be parsed.
pub static DIAGNOSTIC_LINES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "convertbot_diagnostic_lines_total",
            "Diagnostic lines read from the transcoder",
        ),
        &["kind"], // "progress", "other"
    )
    .unwrap()
});

/// Transcoder launches that failed before the process started.
pub static LAUNCH_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "convertbot_launch_failures_total",
        "Transcoder processes that could not be started",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSION_FAILURES.clone()),
        Box::new(REJECTED_REQUESTS.clone()),
        Box::new(DIAGNOSTIC_LINES.clone()),
        Box::new(LAUNCH_FAILURES.clone()),
    ]
}
