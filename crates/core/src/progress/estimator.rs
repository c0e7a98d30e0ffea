//! Elapsed-time to completion-fraction conversion.

use std::time::Duration;

use super::config::EstimatorConfig;

/// Converts elapsed-time samples into a completion fraction.
///
/// With a known total the fraction is exact. Without one, a guessed total is
/// kept ahead of the elapsed time and the fraction is capped below 1.0, so
/// only the process exit can signal completion.
#[derive(Debug, Clone)]
pub struct ProgressEstimator {
    config: EstimatorConfig,
    known_total: Option<f64>,
    estimated_total: Option<f64>,
    samples_seen: u64,
}

impl ProgressEstimator {
    /// Creates an estimator, optionally seeded with a known total in seconds.
    pub fn new(config: EstimatorConfig, known_total: Option<f64>) -> Self {
        Self {
            config,
            known_total: known_total.filter(|t| *t > 0.0),
            estimated_total: None,
            samples_seen: 0,
        }
    }

    /// Creates an estimator with default policy and no known total.
    pub fn with_defaults() -> Self {
        Self::new(EstimatorConfig::default(), None)
    }

    /// Records a total duration discovered after the job started.
    ///
    /// Non-positive totals are ignored.
    pub fn set_known_total(&mut self, total: f64) {
        if total > 0.0 && total.is_finite() {
            self.known_total = Some(total);
        }
    }

    /// The exact total, if one is known.
    pub fn known_total(&self) -> Option<f64> {
        self.known_total
    }

    /// The current guess used while the total is unknown.
    pub fn estimated_total(&self) -> Option<f64> {
        self.estimated_total
    }

    /// Whether any elapsed sample has been observed.
    pub fn has_samples(&self) -> bool {
        self.samples_seen > 0
    }

    /// Folds one elapsed-time sample into the estimate and returns the fraction.
    pub fn observe(&mut self, elapsed: f64) -> f64 {
        self.samples_seen += 1;
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };

        if let Some(total) = self.known_total {
            return (elapsed / total).clamp(0.0, 1.0);
        }

        let estimate = match self.estimated_total {
            None => (elapsed * self.config.initial_guess_multiplier)
                .max(self.config.min_initial_guess_secs),
            Some(current) if elapsed > current * self.config.inflate_threshold => {
                current * self.config.inflate_factor
            }
            Some(current) => current,
        };
        self.estimated_total = Some(estimate);

        if estimate > 0.0 {
            (elapsed / estimate).clamp(0.0, self.config.unknown_total_cap)
        } else {
            0.0
        }
    }

    /// Wall-clock fallback used until the first elapsed sample arrives.
    ///
    /// Returns `None` once samples are flowing.
    pub fn idle_fraction(&self, since_start: Duration) -> Option<f64> {
        if self.has_samples() {
            return None;
        }
        let t = since_start.as_secs_f64();
        Some((0.02 + (t / 60.0).tanh() * 0.6).min(self.config.idle_cap))
    }
}
