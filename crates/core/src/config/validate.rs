use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Poll interval, diagnostic buffer and unique-name attempts are not 0
/// - Estimator constants keep the unknown-total fraction below 1
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.orchestrator.poll_interval_ms == 0 {
        return Err(invalid("orchestrator.poll_interval_ms cannot be 0"));
    }
    if config.converter.diagnostic_buffer == 0 {
        return Err(invalid("converter.diagnostic_buffer cannot be 0"));
    }
    if config.destination.max_unique_attempts == 0 {
        return Err(invalid("destination.max_unique_attempts cannot be 0"));
    }

    let progress = &config.progress;
    if !positive(progress.min_initial_guess_secs) {
        return Err(invalid("progress.min_initial_guess_secs must be positive"));
    }
    if !positive(progress.initial_guess_multiplier) {
        return Err(invalid("progress.initial_guess_multiplier must be positive"));
    }
    if !positive(progress.inflate_threshold) || progress.inflate_threshold > 1.0 {
        return Err(invalid("progress.inflate_threshold must be in (0, 1]"));
    }
    if !positive(progress.inflate_factor) || progress.inflate_factor <= 1.0 {
        return Err(invalid("progress.inflate_factor must be greater than 1"));
    }
    for (name, cap) in [
        ("progress.unknown_total_cap", progress.unknown_total_cap),
        ("progress.idle_cap", progress.idle_cap),
    ] {
        if !positive(cap) || cap >= 1.0 {
            return Err(invalid(&format!("{} must be in (0, 1)", name)));
        }
    }

    Ok(())
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(message: &str) -> ConfigError {
    ConfigError::ValidationError(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_poll_interval_zero_fails() {
        let mut config = Config::default();
        config.orchestrator.poll_interval_ms = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_cap_of_one_fails() {
        let mut config = Config::default();
        config.progress.unknown_total_cap = 1.0;
        assert!(validate_config(&config).is_err());

        let mut config = Config::default();
        config.progress.inflate_factor = 1.0;
        assert!(validate_config(&config).is_err());
    }
}
