use serde::{Deserialize, Serialize};

pub use crate::converter::ConverterConfig;
pub use crate::destination::DestinationConfig;
pub use crate::orchestrator::OrchestratorConfig;
pub use crate::progress::EstimatorConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Transcoder discovery and diagnostics
    #[serde(default)]
    pub converter: ConverterConfig,
    /// Output path resolution
    #[serde(default)]
    pub destination: DestinationConfig,
    /// Job driving
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,
    /// Progress estimation policy
    #[serde(default)]
    pub progress: EstimatorConfig,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.orchestrator.poll_interval_ms, 100);
        assert_eq!(config.destination.max_unique_attempts, 10_000);
        assert_eq!(config.progress.inflate_factor, 1.25);
        assert!(config.converter.ffmpeg_path.is_none());
    }

    #[test]
    fn test_sections_override() {
        let toml = r#"
[converter]
ffmpeg_path = "/opt/ffmpeg/bin/ffmpeg"
probe_duration = false

[progress]
min_initial_guess_secs = 60.0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.converter.ffmpeg_path,
            Some(PathBuf::from("/opt/ffmpeg/bin/ffmpeg"))
        );
        assert!(!config.converter.probe_duration);
        assert_eq!(config.progress.min_initial_guess_secs, 60.0);
        assert_eq!(config.progress.inflate_threshold, 0.9);
    }
}
