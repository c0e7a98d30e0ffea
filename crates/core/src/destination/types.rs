//! Types for the destination module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Outcome of resolving a destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Safe to write here.
    Ready(PathBuf),
    /// The caller's path exists; the caller has to pick an [`OverwriteDecision`].
    NeedsDecision(PathBuf),
}

/// How the caller settles a [`Resolution::NeedsDecision`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwriteDecision {
    /// Remove the existing file and write in its place.
    Overwrite,
    /// Write next to it under a numbered name.
    MakeUnique,
    /// Drop the request.
    Abandon,
}
