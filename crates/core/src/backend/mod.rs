//! Native export backend seam.
//!
//! The host media framework is treated as an opaque capability: given a
//! source and a quality preset it may offer an export session that writes a
//! set of container types, reports fractional progress when polled, and
//! accepts a cancellation request.
//!
//! [`FfmpegExportBackend`] implements the seam with the external transcoder
//! for hosts that have no media framework of their own.

mod error;
mod ffmpeg_export;
mod traits;

pub use error::BackendError;
pub use ffmpeg_export::{preset_file_types, FfmpegExportBackend, FfmpegExportSession};
pub use traits::{ExportSession, NativeBackend};
