//! Types for the converter module.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Video container targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    /// QuickTime movie
    Mov,
    /// MPEG-4 Part 14
    Mp4,
    /// Apple MPEG-4 video
    M4v,
    /// Audio Video Interleave (external process only)
    Avi,
    /// Matroska (external process only)
    Mkv,
}

/// Audio targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// AAC in an MPEG-4 audio container
    M4a,
    /// WAVE (uncompressed)
    Wav,
    /// MPEG Audio Layer III (external process only)
    Mp3,
    /// AAC, written into an `.aac`-named MPEG-4 audio container
    Aac,
    /// Audio Interchange File Format
    Aiff,
}

/// Output file types a native backend can be asked to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    QuickTime,
    Mpeg4,
    AppleM4v,
    AppleM4a,
    Wave,
    Aiff,
}

/// Requested output kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "format", rename_all = "snake_case")]
pub enum TargetFormat {
    Video(VideoFormat),
    Audio(AudioFormat),
}

/// How a target format gets encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionStrategy {
    /// The host media framework encodes using quality presets.
    NativeBackend,
    /// A separately launched transcoder process encodes.
    ExternalProcess,
}

impl ConversionStrategy {
    /// Label used for metrics and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NativeBackend => "native",
            Self::ExternalProcess => "external",
        }
    }
}

/// Quality presets offered by the native backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityPreset {
    /// Copy streams without re-encoding.
    Passthrough,
    HighestQuality,
    MediumQuality,
    LowQuality,
    /// AAC audio in an MPEG-4 audio container.
    AppleM4a,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Passthrough => "passthrough",
            Self::HighestQuality => "highest_quality",
            Self::MediumQuality => "medium_quality",
            Self::LowQuality => "low_quality",
            Self::AppleM4a => "apple_m4a",
        }
    }
}

impl FromStr for QualityPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "passthrough" => Ok(Self::Passthrough),
            "highest" | "highest_quality" => Ok(Self::HighestQuality),
            "medium" | "medium_quality" => Ok(Self::MediumQuality),
            "low" | "low_quality" => Ok(Self::LowQuality),
            "m4a" | "apple_m4a" => Ok(Self::AppleM4a),
            other => Err(format!("unknown quality preset: {}", other)),
        }
    }
}

impl TargetFormat {
    /// All supported targets.
    pub const ALL: [TargetFormat; 10] = [
        Self::Video(VideoFormat::Mov),
        Self::Video(VideoFormat::Mp4),
        Self::Video(VideoFormat::M4v),
        Self::Video(VideoFormat::Avi),
        Self::Video(VideoFormat::Mkv),
        Self::Audio(AudioFormat::M4a),
        Self::Audio(AudioFormat::Wav),
        Self::Audio(AudioFormat::Mp3),
        Self::Audio(AudioFormat::Aac),
        Self::Audio(AudioFormat::Aiff),
    ];

    /// File extension of the produced file.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Video(VideoFormat::Mov) => "mov",
            Self::Video(VideoFormat::Mp4) => "mp4",
            Self::Video(VideoFormat::M4v) => "m4v",
            Self::Video(VideoFormat::Avi) => "avi",
            Self::Video(VideoFormat::Mkv) => "mkv",
            Self::Audio(AudioFormat::M4a) => "m4a",
            Self::Audio(AudioFormat::Wav) => "wav",
            Self::Audio(AudioFormat::Mp3) => "mp3",
            Self::Audio(AudioFormat::Aac) => "aac",
            Self::Audio(AudioFormat::Aiff) => "aiff",
        }
    }

    /// Upper-case name for status text.
    pub fn display_name(&self) -> String {
        self.extension().to_ascii_uppercase()
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, Self::Audio(_))
    }

    /// Static strategy table. Every target resolves to exactly one strategy.
    ///
    /// MP3 always goes to the external process: the native MP3 encoder is not
    /// reliable across host versions.
    pub fn strategy(&self) -> ConversionStrategy {
        match self {
            Self::Video(VideoFormat::Mov | VideoFormat::Mp4 | VideoFormat::M4v) => {
                ConversionStrategy::NativeBackend
            }
            Self::Video(VideoFormat::Avi | VideoFormat::Mkv) => ConversionStrategy::ExternalProcess,
            Self::Audio(AudioFormat::M4a | AudioFormat::Wav | AudioFormat::Aac | AudioFormat::Aiff) => {
                ConversionStrategy::NativeBackend
            }
            Self::Audio(AudioFormat::Mp3) => ConversionStrategy::ExternalProcess,
        }
    }

    /// File type requested from a native backend. MP3 has none.
    pub fn file_type(&self) -> Option<FileType> {
        match self {
            Self::Video(VideoFormat::Mp4) => Some(FileType::Mpeg4),
            Self::Video(VideoFormat::M4v) => Some(FileType::AppleM4v),
            Self::Video(_) => Some(FileType::QuickTime),
            Self::Audio(AudioFormat::M4a | AudioFormat::Aac) => Some(FileType::AppleM4a),
            Self::Audio(AudioFormat::Wav) => Some(FileType::Wave),
            Self::Audio(AudioFormat::Mp3) => None,
            Self::Audio(AudioFormat::Aiff) => Some(FileType::Aiff),
        }
    }

    /// Ordered presets to try on the native backend; the first whose output
    /// capabilities include [`Self::file_type`] wins.
    pub fn native_presets(&self, compress: bool, chosen: QualityPreset) -> Vec<QualityPreset> {
        use QualityPreset::*;
        match (self, compress) {
            (Self::Video(_), true) => vec![chosen],
            (Self::Video(_), false) => vec![Passthrough, HighestQuality],
            (Self::Audio(AudioFormat::M4a | AudioFormat::Aac), true) => vec![AppleM4a],
            (Self::Audio(AudioFormat::M4a), false) => vec![AppleM4a, Passthrough],
            (Self::Audio(AudioFormat::Aac), false) => vec![AppleM4a],
            (Self::Audio(AudioFormat::Wav | AudioFormat::Aiff), true) => {
                vec![AppleM4a, Passthrough, HighestQuality]
            }
            (Self::Audio(AudioFormat::Wav | AudioFormat::Aiff), false) => {
                vec![Passthrough, HighestQuality]
            }
            (Self::Audio(AudioFormat::Mp3), _) => Vec::new(),
        }
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for TargetFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim_start_matches('.').to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == wanted)
            .ok_or_else(|| format!("unsupported target format: {}", s))
    }
}

/// A single conversion request. Immutable once the job starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Source media file.
    pub source: PathBuf,
    /// Requested output kind.
    pub target: TargetFormat,
    /// Whether to re-encode with `quality_preset` instead of preserving quality.
    #[serde(default)]
    pub compress: bool,
    /// Preset used when `compress` is set (video only).
    pub quality_preset: QualityPreset,
    /// Explicit destination; synthesized next to the source when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<PathBuf>,
    /// Pre-authorizes replacing an existing destination.
    #[serde(default)]
    pub allow_overwrite: bool,
}

impl ConversionRequest {
    /// Creates a request with default options.
    pub fn new(source: impl Into<PathBuf>, target: TargetFormat) -> Self {
        Self {
            source: source.into(),
            target,
            compress: false,
            quality_preset: QualityPreset::HighestQuality,
            destination: None,
            allow_overwrite: false,
        }
    }

    /// Sets an explicit destination.
    pub fn with_destination(mut self, destination: impl Into<PathBuf>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    /// Requests compression with the given preset.
    pub fn with_compression(mut self, preset: QualityPreset) -> Self {
        self.compress = true;
        self.quality_preset = preset;
        self
    }

    /// Pre-authorizes overwriting an existing destination.
    pub fn with_overwrite(mut self, allow: bool) -> Self {
        self.allow_overwrite = allow;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_target_has_one_strategy() {
        let external: Vec<_> = TargetFormat::ALL
            .iter()
            .filter(|f| f.strategy() == ConversionStrategy::ExternalProcess)
            .map(|f| f.extension())
            .collect();
        assert_eq!(external, vec!["avi", "mkv", "mp3"]);
    }

    #[test]
    fn test_parse_target_format() {
        assert_eq!(
            "MP3".parse::<TargetFormat>().unwrap(),
            TargetFormat::Audio(AudioFormat::Mp3)
        );
        assert_eq!(
            ".mkv".parse::<TargetFormat>().unwrap(),
            TargetFormat::Video(VideoFormat::Mkv)
        );
        assert!("flac".parse::<TargetFormat>().is_err());
    }

    #[test]
    fn test_aac_is_written_as_m4a_file_type() {
        let aac = TargetFormat::Audio(AudioFormat::Aac);
        assert_eq!(aac.extension(), "aac");
        assert_eq!(aac.file_type(), Some(FileType::AppleM4a));
    }

    #[test]
    fn test_mp3_has_no_native_route() {
        let mp3 = TargetFormat::Audio(AudioFormat::Mp3);
        assert_eq!(mp3.file_type(), None);
        assert!(mp3.native_presets(false, QualityPreset::Passthrough).is_empty());
    }

    #[test]
    fn test_video_presets() {
        let mp4 = TargetFormat::Video(VideoFormat::Mp4);
        assert_eq!(
            mp4.native_presets(false, QualityPreset::LowQuality),
            vec![QualityPreset::Passthrough, QualityPreset::HighestQuality]
        );
        assert_eq!(
            mp4.native_presets(true, QualityPreset::LowQuality),
            vec![QualityPreset::LowQuality]
        );
    }

    #[test]
    fn test_audio_presets_ignore_chosen_video_preset() {
        let wav = TargetFormat::Audio(AudioFormat::Wav);
        assert_eq!(
            wav.native_presets(true, QualityPreset::LowQuality),
            vec![
                QualityPreset::AppleM4a,
                QualityPreset::Passthrough,
                QualityPreset::HighestQuality
            ]
        );
    }

    #[test]
    fn test_request_builder() {
        let request = ConversionRequest::new("/media/clip.mov", TargetFormat::Video(VideoFormat::Mp4))
            .with_destination("/out/clip.mp4")
            .with_compression(QualityPreset::MediumQuality)
            .with_overwrite(true);
        assert!(request.compress);
        assert!(request.allow_overwrite);
        assert_eq!(request.quality_preset, QualityPreset::MediumQuality);
        assert_eq!(request.destination, Some(PathBuf::from("/out/clip.mp4")));
    }

    #[test]
    fn test_parse_preset() {
        assert_eq!("low".parse::<QualityPreset>().unwrap(), QualityPreset::LowQuality);
        assert!("ultra".parse::<QualityPreset>().is_err());
    }
}
