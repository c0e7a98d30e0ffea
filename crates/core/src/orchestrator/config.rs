//! Orchestrator configuration.

use serde::{Deserialize, Serialize};

use crate::converter::QualityPreset;

/// Configuration for the conversion orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// How often to poll the native backend for progress (milliseconds).
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,

    /// Preset used for video when compression is requested without an
    /// explicit choice.
    #[serde(default = "default_video_preset")]
    pub video_preset: QualityPreset,
}

fn default_poll_interval() -> u64 {
    100
}

fn default_video_preset() -> QualityPreset {
    QualityPreset::HighestQuality
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
            video_preset: default_video_preset(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = OrchestratorConfig::default();
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.video_preset, QualityPreset::HighestQuality);
    }

    #[test]
    fn test_deserialize_full() {
        let toml = r#"
            poll_interval_ms = 250
            video_preset = "medium_quality"
        "#;
        let config: OrchestratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.poll_interval_ms, 250);
        assert_eq!(config.video_preset, QualityPreset::MediumQuality);
    }
}
