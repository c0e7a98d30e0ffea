//! Configuration for the destination module.

use serde::{Deserialize, Serialize};

/// Configuration for destination resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Numbered candidates tried before giving up on a unique name.
    #[serde(default = "default_max_unique_attempts")]
    pub max_unique_attempts: u32,
}

fn default_max_unique_attempts() -> u32 {
    10_000
}

impl Default for DestinationConfig {
    fn default() -> Self {
        Self {
            max_unique_attempts: default_max_unique_attempts(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(DestinationConfig::default().max_unique_attempts, 10_000);
    }

    #[test]
    fn test_config_from_toml() {
        let config: DestinationConfig = toml::from_str("max_unique_attempts = 5").unwrap();
        assert_eq!(config.max_unique_attempts, 5);
        let config: DestinationConfig = toml::from_str("").unwrap();
        assert_eq!(config.max_unique_attempts, 10_000);
    }
}
