//! Testing utilities and mock implementations for end-to-end tests.
//!
//! This module provides mock implementations of the transcoder and native
//! backend seams, allowing the orchestrator to be driven without ffmpeg or a
//! host media framework.
//!
//! # Example
//!
//! ```rust,ignore
//! use convertbot_core::testing::{MockNativeBackend, MockTranscoder};
//!
//! let transcoder = MockTranscoder::new()
//!     .with_line(Duration::ZERO, "Duration: 00:00:10.00, start: 0")
//!     .with_line(Duration::from_millis(10), "time=00:00:05.00");
//! let backend = MockNativeBackend::new();
//!
//! let orchestrator = ConversionOrchestrator::new(
//!     config,
//!     Arc::new(backend),
//!     Arc::new(transcoder),
//! );
//! ```

mod mock_native_backend;
mod mock_transcoder;

pub use mock_native_backend::{MockNativeBackend, RecordedExport};
pub use mock_transcoder::MockTranscoder;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::path::{Path, PathBuf};

    use crate::config::Config;
    use crate::converter::ConverterConfig;

    /// Create an empty source media file named `name` in `dir`.
    pub fn source_file(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"").expect("failed to create fixture source");
        path
    }

    /// Diagnostic lines a transcoder prints for a clip of `total_secs`,
    /// followed by one progress line per entry of `elapsed`.
    pub fn diagnostic_script(total_secs: u32, elapsed: &[u32]) -> Vec<String> {
        let mut lines = vec![
            "Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.mov':".to_string(),
            format!(
                "  Duration: 00:{:02}:{:02}.00, start: 0.000000, bitrate: 1411 kb/s",
                total_secs / 60,
                total_secs % 60
            ),
        ];
        lines.extend(elapsed.iter().map(|t| {
            format!(
                "size=     128kB time=00:{:02}:{:02}.00 bitrate= 320.0kbits/s speed=8.0x",
                t / 60,
                t % 60
            )
        }));
        lines
    }

    /// Configuration pinned to a fake ffmpeg, with logs in `log_dir` and
    /// probing disabled.
    pub fn test_config(log_dir: &Path) -> Config {
        let mut config = Config::default();
        config.converter = ConverterConfig::with_ffmpeg(PathBuf::from("/opt/convertbot/ffmpeg"))
            .with_log_dir(log_dir.to_path_buf())
            .with_probe(false);
        config.orchestrator.poll_interval_ms = 10;
        config
    }
}
