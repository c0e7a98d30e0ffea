//! Filesystem-backed destination resolver.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

use super::config::DestinationConfig;
use super::error::DestinationError;
use super::types::{OverwriteDecision, Resolution};

/// Resolves output paths against the filesystem.
#[derive(Debug, Clone)]
pub struct DestinationResolver {
    config: DestinationConfig,
}

impl DestinationResolver {
    /// Creates a new resolver with the given configuration.
    pub fn new(config: DestinationConfig) -> Self {
        Self { config }
    }

    /// Creates a resolver with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(DestinationConfig::default())
    }

    /// Finalizes the output path for a conversion of `source`.
    ///
    /// Without a `provided` path the output goes next to the source under a
    /// unique name, so no decision is ever needed. A provided path that
    /// exists yields [`Resolution::NeedsDecision`] unless `allow_overwrite`
    /// is set, in which case the existing file is removed.
    pub async fn resolve(
        &self,
        provided: Option<&Path>,
        source: &Path,
        extension: &str,
        allow_overwrite: bool,
    ) -> Result<Resolution, DestinationError> {
        let Some(provided) = provided else {
            let stem = source
                .file_stem()
                .filter(|s| !s.is_empty())
                .ok_or_else(|| DestinationError::InvalidSource {
                    path: source.to_path_buf(),
                })?;
            let base = source.with_file_name(stem);
            return self.uniquify(&base, extension).await.map(Resolution::Ready);
        };

        if !exists(provided).await? {
            return Ok(Resolution::Ready(provided.to_path_buf()));
        }

        if allow_overwrite {
            remove_existing(provided).await?;
            return Ok(Resolution::Ready(provided.to_path_buf()));
        }

        debug!("Destination {} exists, decision required", provided.display());
        Ok(Resolution::NeedsDecision(provided.to_path_buf()))
    }

    /// Settles a pending decision about `existing`.
    ///
    /// Returns the path to write to, or `None` when the request is abandoned.
    pub async fn apply_decision(
        &self,
        existing: &Path,
        extension: &str,
        decision: OverwriteDecision,
    ) -> Result<Option<PathBuf>, DestinationError> {
        match decision {
            OverwriteDecision::Overwrite => {
                remove_existing(existing).await?;
                Ok(Some(existing.to_path_buf()))
            }
            OverwriteDecision::MakeUnique => {
                let extension = existing
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or(extension);
                let base = existing.with_extension("");
                self.uniquify(&base, extension).await.map(Some)
            }
            OverwriteDecision::Abandon => Ok(None),
        }
    }

    /// Returns the first free path among `base.ext`, `base-1.ext`, `base-2.ext`, ...
    pub async fn uniquify(&self, base: &Path, extension: &str) -> Result<PathBuf, DestinationError> {
        for attempt in 0..self.config.max_unique_attempts {
            let candidate = numbered(base, extension, attempt);
            if !exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(DestinationError::UniquifyExhausted {
            base: base.to_path_buf(),
            attempts: self.config.max_unique_attempts,
        })
    }
}

fn numbered(base: &Path, extension: &str, n: u32) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    if n > 0 {
        name.push(format!("-{}", n));
    }
    if !extension.is_empty() {
        name.push(".");
        name.push(extension);
    }
    PathBuf::from(name)
}

async fn exists(path: &Path) -> Result<bool, DestinationError> {
    fs::try_exists(path)
        .await
        .map_err(|e| DestinationError::inspect_failed(path.to_path_buf(), e))
}

async fn remove_existing(path: &Path) -> Result<(), DestinationError> {
    match fs::remove_file(path).await {
        Ok(()) => {
            info!("Removed existing {} for overwrite", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DestinationError::remove_failed(path.to_path_buf(), e)),
    }
}
