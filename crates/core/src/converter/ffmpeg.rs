//! FFmpeg argument construction and duration probing.

use serde::Deserialize;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use super::types::{AudioFormat, TargetFormat, VideoFormat};

/// Codec flags for targets encoded by the external process.
///
/// Returns `None` for targets the native backend handles.
pub fn external_codec_args(target: TargetFormat) -> Option<&'static [&'static str]> {
    match target {
        // MPEG-4 Part 2 for the widest AVI player compatibility.
        TargetFormat::Video(VideoFormat::Avi) => Some(&["-c:v", "mpeg4", "-q:v", "5"]),
        TargetFormat::Video(VideoFormat::Mkv) => Some(&[
            "-c:v", "libx264", "-crf", "18", "-preset", "medium", "-c:a", "copy",
        ]),
        TargetFormat::Audio(AudioFormat::Mp3) => Some(&["-codec:a", "libmp3lame", "-q:a", "2"]),
        _ => None,
    }
}

/// Builds the full argument vector for an external conversion.
///
/// `-y` is always passed: overwrite confirmation happens before launch.
pub fn build_external_args(
    target: TargetFormat,
    input_path: &Path,
    output_path: &Path,
) -> Option<Vec<String>> {
    let codec = external_codec_args(target)?;
    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        input_path.to_string_lossy().to_string(),
    ];
    args.extend(codec.iter().map(|s| s.to_string()));
    args.push(output_path.to_string_lossy().to_string());
    Some(args)
}

/// Parses the duration out of `ffprobe -print_format json -show_format` output.
pub fn parse_probe_duration(output: &str) -> Option<f64> {
    #[derive(Deserialize)]
    struct ProbeOutput {
        format: ProbeFormat,
    }

    #[derive(Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }

    let probe: ProbeOutput = serde_json::from_str(output).ok()?;
    probe
        .format
        .duration
        .and_then(|d| d.parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d > 0.0)
}

/// Best-effort source duration lookup. Any failure means "unknown".
pub async fn probe_duration(ffprobe: &Path, source: &Path) -> Option<f64> {
    let output = Command::new(ffprobe)
        .args(["-v", "quiet", "-print_format", "json", "-show_format"])
        .arg(source)
        .stdin(Stdio::null())
        .output()
        .await;

    match output {
        Ok(o) if o.status.success() => parse_probe_duration(&String::from_utf8_lossy(&o.stdout)),
        Ok(o) => {
            debug!("ffprobe exited with {:?} for {:?}", o.status.code(), source);
            None
        }
        Err(e) => {
            debug!("ffprobe could not run for {:?}: {}", source, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_mp3() {
        let args = build_external_args(
            TargetFormat::Audio(AudioFormat::Mp3),
            Path::new("/media/clip.mov"),
            Path::new("/media/clip.mp3"),
        )
        .unwrap();
        assert_eq!(
            args,
            vec!["-y", "-i", "/media/clip.mov", "-codec:a", "libmp3lame", "-q:a", "2", "/media/clip.mp3"]
        );
    }

    #[test]
    fn test_build_args_avi() {
        let args = build_external_args(
            TargetFormat::Video(VideoFormat::Avi),
            Path::new("/in.mov"),
            Path::new("/out.avi"),
        )
        .unwrap();
        assert!(args.contains(&"mpeg4".to_string()));
        assert!(args.contains(&"-q:v".to_string()));
        assert_eq!(args.first().map(String::as_str), Some("-y"));
        assert_eq!(args.last().map(String::as_str), Some("/out.avi"));
    }

    #[test]
    fn test_build_args_mkv() {
        let args = build_external_args(
            TargetFormat::Video(VideoFormat::Mkv),
            Path::new("/in.mov"),
            Path::new("/out.mkv"),
        )
        .unwrap();
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-crf".to_string()));
        assert!(args.contains(&"18".to_string()));
        assert!(args.contains(&"copy".to_string()));
    }

    #[test]
    fn test_native_targets_have_no_external_args() {
        assert!(build_external_args(
            TargetFormat::Video(VideoFormat::Mp4),
            Path::new("/in.mov"),
            Path::new("/out.mp4"),
        )
        .is_none());
    }

    #[test]
    fn test_parse_probe_duration() {
        let json = r#"{
            "format": {
                "filename": "clip.mov",
                "format_name": "mov,mp4,m4a,3gp,3g2,mj2",
                "duration": "83.450000",
                "size": "30000000"
            }
        }"#;
        let duration = parse_probe_duration(json).unwrap();
        assert!((duration - 83.45).abs() < 1e-9);
    }

    #[test]
    fn test_parse_probe_duration_missing() {
        assert!(parse_probe_duration(r#"{"format": {}}"#).is_none());
        assert!(parse_probe_duration("not json").is_none());
        assert!(parse_probe_duration(r#"{"format": {"duration": "N/A"}}"#).is_none());
    }
}
