//! Terminal progress display and overwrite prompt.

use anyhow::{Context, Result};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use convertbot_core::{JobState, OverwriteDecision, ProgressUpdate};

const STATUS_WIDTH: usize = 72;

/// Redraws a single status line on stderr whenever progress changes.
pub fn spawn_progress_printer(mut rx: watch::Receiver<ProgressUpdate>) -> JoinHandle<()> {
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let update = rx.borrow_and_update().clone();
            if matches!(update.state, JobState::Preparing | JobState::Running) {
                let mut stderr = io::stderr().lock();
                let _ = write!(stderr, "\r\x1b[2K{}", progress_line(&update));
                let _ = stderr.flush();
            }
        }
    })
}

/// Erases the status line.
pub fn clear_line() {
    let mut stderr = io::stderr().lock();
    let _ = write!(stderr, "\r\x1b[2K");
    let _ = stderr.flush();
}

fn progress_line(update: &ProgressUpdate) -> String {
    let percent = (update.progress.clamp(0.0, 1.0) * 100.0).floor() as u32;
    let status: String = update.status.chars().take(STATUS_WIDTH).collect();
    format!("[{:>3}%] {}", percent, status)
}

/// Asks on the terminal how to handle an existing destination.
///
/// Without a terminal to ask on, the request is abandoned.
pub async fn prompt_decision(existing: &Path) -> Result<OverwriteDecision> {
    if !io::stdin().is_terminal() {
        warn!(
            "{} exists and stdin is not a terminal, abandoning",
            existing.display()
        );
        return Ok(OverwriteDecision::Abandon);
    }

    let existing = existing.display().to_string();
    tokio::task::spawn_blocking(move || -> io::Result<OverwriteDecision> {
        clear_line();
        loop {
            eprint!(
                "{} already exists. [o]verwrite, make [u]nique, [a]bandon? ",
                existing
            );
            io::stderr().flush()?;
            let mut answer = String::new();
            if io::stdin().read_line(&mut answer)? == 0 {
                return Ok(OverwriteDecision::Abandon);
            }
            if let Some(decision) = parse_decision(&answer) {
                return Ok(decision);
            }
        }
    })
    .await
    .context("Prompt task failed")?
    .context("Failed to read answer")
}

fn parse_decision(answer: &str) -> Option<OverwriteDecision> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "o" | "overwrite" => Some(OverwriteDecision::Overwrite),
        "u" | "unique" | "make unique" => Some(OverwriteDecision::MakeUnique),
        "a" | "abandon" | "" => Some(OverwriteDecision::Abandon),
        _ => None,
    }
}
