//! Timecode parsing and formatting.
//!
//! Transcoders report positions as `H:MM:SS[.fff]`, `MM:SS[.fff]` or a bare
//! number of seconds. Anything else is rejected.

use thiserror::Error;

/// Errors produced while decoding a timecode token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimecodeError {
    /// The token did not split into one to three `:`-separated parts.
    #[error("invalid timecode shape ({parts} parts): {token:?}")]
    WrongShape { token: String, parts: usize },

    /// One of the parts was not a finite decimal number.
    #[error("invalid timecode component {part:?} in {token:?}")]
    NotNumeric { token: String, part: String },
}

/// Decodes a timecode token into seconds.
pub fn parse_timecode(token: &str) -> Result<f64, TimecodeError> {
    let parts: Vec<&str> = token.split(':').collect();
    if parts.is_empty() || parts.len() > 3 {
        return Err(TimecodeError::WrongShape {
            token: token.to_string(),
            parts: parts.len(),
        });
    }

    let mut seconds = 0.0;
    for part in &parts {
        let value = part
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| TimecodeError::NotNumeric {
                token: token.to_string(),
                part: part.to_string(),
            })?;
        seconds = seconds * 60.0 + value;
    }

    Ok(seconds)
}

/// Formats seconds for status text: `mm:ss`, or `h:mm:ss` past the hour.
pub fn format_timecode(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "--:--".to_string();
    }
    let total = seconds.round().max(0.0) as u64;
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}
