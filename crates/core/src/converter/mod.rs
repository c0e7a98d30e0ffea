//! Target formats, strategy selection and external transcoder plumbing.
//!
//! Every [`TargetFormat`] maps to exactly one [`ConversionStrategy`]: the
//! native backend for containers the host media framework can write, the
//! external ffmpeg process for the rest.
//!
//! # Example
//!
//! ```ignore
//! use convertbot_core::converter::{build_external_args, TargetFormat};
//!
//! let target: TargetFormat = "mp3".parse()?;
//! assert_eq!(target.strategy(), ConversionStrategy::ExternalProcess);
//!
//! let args = build_external_args(target, Path::new("clip.mov"), Path::new("clip.mp3"));
//! ```

mod config;
mod error;
mod ffmpeg;
mod locator;
mod types;

pub use config::ConverterConfig;
pub use error::ConversionError;
pub use ffmpeg::{build_external_args, external_codec_args, parse_probe_duration, probe_duration};
pub use locator::{ffmpeg_available, locate_ffmpeg, locate_ffprobe};
pub use types::{
    AudioFormat, ConversionRequest, ConversionStrategy, FileType, QualityPreset, TargetFormat,
    VideoFormat,
};
