//! Transcoder executable discovery.

use std::path::{Path, PathBuf};

use super::config::ConverterConfig;

/// Resolves the ffmpeg binary.
///
/// Order: explicit override, bundled copy next to the running executable,
/// the known installation directory, system locations, then `PATH`.
pub fn locate_ffmpeg(config: &ConverterConfig) -> Option<PathBuf> {
    if let Some(path) = &config.ffmpeg_path {
        return Some(path.clone());
    }
    locate_tool("ffmpeg", config)
}

/// Resolves the ffprobe binary, preferring a sibling of the resolved ffmpeg.
pub fn locate_ffprobe(config: &ConverterConfig) -> Option<PathBuf> {
    if let Some(path) = &config.ffprobe_path {
        return Some(path.clone());
    }
    if let Some(sibling) = config
        .ffmpeg_path
        .as_ref()
        .and_then(|p| p.parent())
        .map(|dir| dir.join(binary_name("ffprobe")))
    {
        if is_executable(&sibling) {
            return Some(sibling);
        }
    }
    locate_tool("ffprobe", config)
}

/// Whether an external transcoder can be found, without starting a job.
pub fn ffmpeg_available(config: &ConverterConfig) -> bool {
    locate_ffmpeg(config).is_some_and(|p| is_executable(&p))
}

fn locate_tool(name: &str, config: &ConverterConfig) -> Option<PathBuf> {
    let file_name = binary_name(name);

    let bundled = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));

    bundled
        .into_iter()
        .chain(config.install_dir.iter().cloned())
        .chain(config.system_search_paths.iter().cloned())
        .map(|dir| dir.join(&file_name))
        .find(|candidate| is_executable(candidate))
        .or_else(|| which::which(name).ok())
}

fn binary_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}
