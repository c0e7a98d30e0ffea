//! Command-line arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use convertbot_core::{OverwriteDecision, QualityPreset, TargetFormat};

#[derive(Debug, Parser)]
#[command(name = "convertbot")]
#[command(about = "Convert audio and video files with progress and cancellation")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (TOML). Environment variables prefixed
    /// CONVERTBOT_ override it.
    #[arg(short, long, global = true, env = "CONVERTBOT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Convert one file
    Convert(ConvertArgs),

    /// Report where the external transcoder was found
    Doctor,

    /// List target formats and how each is encoded
    Formats,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Source media file
    pub source: PathBuf,

    /// Target format (mov, mp4, m4v, avi, mkv, m4a, wav, mp3, aac, aiff)
    #[arg(short, long)]
    pub to: TargetFormat,

    /// Output path. Defaults to the source name with the new extension,
    /// numbered when taken.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Re-encode to a smaller file instead of preserving quality
    #[arg(long)]
    pub compress: bool,

    /// Preset used with --compress (passthrough, highest, medium, low, m4a)
    #[arg(long, requires = "compress")]
    pub preset: Option<QualityPreset>,

    /// Replace an existing output file without asking
    #[arg(long, conflicts_with = "make_unique")]
    pub overwrite: bool,

    /// Write next to an existing output file under a numbered name
    #[arg(long)]
    pub make_unique: bool,

    /// Print the job report as JSON when done
    #[arg(long)]
    pub json: bool,

    /// Print Prometheus metrics to stderr when done
    #[arg(long)]
    pub metrics: bool,
}

impl ConvertArgs {
    /// Decision to apply without prompting, if one was given.
    pub fn preset_decision(&self) -> Option<OverwriteDecision> {
        if self.overwrite {
            Some(OverwriteDecision::Overwrite)
        } else if self.make_unique {
            Some(OverwriteDecision::MakeUnique)
        } else {
            None
        }
    }
}
