//! Configuration for the converter module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where to find the external transcoder and how to run it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConverterConfig {
    /// Explicit path to the ffmpeg binary. Skips discovery when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffmpeg_path: Option<PathBuf>,

    /// Explicit path to the ffprobe binary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ffprobe_path: Option<PathBuf>,

    /// Known installation directory searched after the bundled copy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_dir: Option<PathBuf>,

    /// Standard system locations, searched in order.
    #[serde(default = "default_system_search_paths")]
    pub system_search_paths: Vec<PathBuf>,

    /// Directory for per-invocation diagnostic logs.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Probe the source duration with ffprobe before launching.
    #[serde(default = "default_true")]
    pub probe_duration: bool,

    /// Capacity of the channel between the diagnostic reader and its consumer.
    #[serde(default = "default_diagnostic_buffer")]
    pub diagnostic_buffer: usize,
}

fn default_system_search_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/local/bin"),
        PathBuf::from("/opt/homebrew/bin"),
        PathBuf::from("/usr/bin"),
    ]
}

fn default_log_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_true() -> bool {
    true
}

fn default_diagnostic_buffer() -> usize {
    256
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: None,
            ffprobe_path: None,
            install_dir: None,
            system_search_paths: default_system_search_paths(),
            log_dir: default_log_dir(),
            probe_duration: true,
            diagnostic_buffer: default_diagnostic_buffer(),
        }
    }
}

impl ConverterConfig {
    /// Creates a config pinned to an explicit ffmpeg binary.
    pub fn with_ffmpeg(ffmpeg_path: PathBuf) -> Self {
        Self {
            ffmpeg_path: Some(ffmpeg_path),
            ..Default::default()
        }
    }

    /// Sets the diagnostic log directory.
    pub fn with_log_dir(mut self, log_dir: PathBuf) -> Self {
        self.log_dir = log_dir;
        self
    }

    /// Enables or disables the ffprobe duration probe.
    pub fn with_probe(mut self, enabled: bool) -> Self {
        self.probe_duration = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConverterConfig::default();
        assert!(config.ffmpeg_path.is_none());
        assert_eq!(config.system_search_paths.len(), 3);
        assert!(config.probe_duration);
        assert_eq!(config.diagnostic_buffer, 256);
    }

    #[test]
    fn test_config_builder() {
        let config = ConverterConfig::with_ffmpeg(PathBuf::from("/opt/ffmpeg"))
            .with_log_dir(PathBuf::from("/tmp/logs"))
            .with_probe(false);
        assert_eq!(config.ffmpeg_path, Some(PathBuf::from("/opt/ffmpeg")));
        assert_eq!(config.log_dir, PathBuf::from("/tmp/logs"));
        assert!(!config.probe_duration);
    }

    #[test]
    fn test_config_serialization() {
        let config = ConverterConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ConverterConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.system_search_paths, config.system_search_paths);
    }
}
