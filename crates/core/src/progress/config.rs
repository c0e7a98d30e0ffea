//! Tunable estimator policy.

use serde::{Deserialize, Serialize};

/// Heuristic constants used while the total duration is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Lower bound of the first total-duration guess, in seconds.
    #[serde(default = "default_min_initial_guess")]
    pub min_initial_guess_secs: f64,

    /// First guess is `elapsed * multiplier` when that exceeds the minimum.
    #[serde(default = "default_initial_multiplier")]
    pub initial_guess_multiplier: f64,

    /// Fraction of the guess past which the guess is inflated.
    #[serde(default = "default_inflate_threshold")]
    pub inflate_threshold: f64,

    /// Growth factor applied to the guess.
    #[serde(default = "default_inflate_factor")]
    pub inflate_factor: f64,

    /// Ceiling of the fraction while the total is unknown.
    #[serde(default = "default_unknown_cap")]
    pub unknown_total_cap: f64,

    /// Ceiling of the wall-clock fallback curve.
    #[serde(default = "default_idle_cap")]
    pub idle_cap: f64,
}

fn default_min_initial_guess() -> f64 {
    30.0
}

fn default_initial_multiplier() -> f64 {
    2.0
}

fn default_inflate_threshold() -> f64 {
    0.9
}

fn default_inflate_factor() -> f64 {
    1.25
}

fn default_unknown_cap() -> f64 {
    0.98
}

fn default_idle_cap() -> f64 {
    0.95
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            min_initial_guess_secs: default_min_initial_guess(),
            initial_guess_multiplier: default_initial_multiplier(),
            inflate_threshold: default_inflate_threshold(),
            inflate_factor: default_inflate_factor(),
            unknown_total_cap: default_unknown_cap(),
            idle_cap: default_idle_cap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EstimatorConfig::default();
        assert_eq!(config.min_initial_guess_secs, 30.0);
        assert_eq!(config.inflate_threshold, 0.9);
        assert_eq!(config.inflate_factor, 1.25);
        assert_eq!(config.unknown_total_cap, 0.98);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: EstimatorConfig = toml::from_str("inflate_factor = 1.5").unwrap();
        assert_eq!(config.inflate_factor, 1.5);
        assert_eq!(config.min_initial_guess_secs, 30.0);
    }
}
