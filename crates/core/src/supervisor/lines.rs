//! Diagnostic stream line splitting and marker extraction.

use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::timecode::parse_timecode;

static DURATION_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Duration:\s*([^,]*)").expect("valid duration regex"));

static TIME_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=\s*(\S+)").expect("valid time regex"));

/// Splits a byte stream into lines, carrying partial lines across reads.
///
/// Both `\n` and `\r` terminate a line; empty lines are dropped. Splitting
/// happens on raw bytes so multi-byte UTF-8 sequences are never cut.
#[derive(Debug, Default)]
pub struct LineSplitter {
    pending: Vec<u8>,
}

impl LineSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds a chunk and returns every line it completed, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();
        for &byte in chunk {
            if byte == b'\n' || byte == b'\r' {
                if !self.pending.is_empty() {
                    lines.push(String::from_utf8_lossy(&self.pending).into_owned());
                    self.pending.clear();
                }
            } else {
                self.pending.push(byte);
            }
        }
        lines
    }

    /// The unterminated fragment left over, if any.
    pub fn remainder(&self) -> Option<String> {
        if self.pending.is_empty() {
            None
        } else {
            Some(String::from_utf8_lossy(&self.pending).into_owned())
        }
    }
}

/// Extracts the total duration from a `Duration: 00:01:23.45, start: ...` line.
pub fn parse_duration_marker(line: &str) -> Option<f64> {
    let token = DURATION_MARKER.captures(line)?.get(1)?.as_str().trim();
    if token.is_empty() {
        return None;
    }
    parse_timecode(token).ok()
}

/// Extracts the elapsed position from a `... time=00:00:05.00 bitrate=...` line.
pub fn parse_elapsed_marker(line: &str) -> Option<f64> {
    let token = TIME_MARKER.captures(line)?.get(1)?.as_str();
    parse_timecode(token).ok()
}
