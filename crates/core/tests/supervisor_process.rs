//! Process supervisor integration tests against real child processes.
//!
//! Each test writes a small shell script standing in for the transcoder.

#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;

use convertbot_core::{
    CancelSignal, DiagnosticSample, ProcessSupervisor, TranscodeInvocation, Transcoder,
};

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).expect("Failed to write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("Failed to mark script executable");
    path
}

async fn run_script(
    dir: &TempDir,
    script: &Path,
    hint: Option<f64>,
    cancel: CancelSignal,
) -> (convertbot_core::ProcessExit, Vec<DiagnosticSample>) {
    let supervisor = ProcessSupervisor::new(dir.path(), 64);
    let mut samples = Vec::new();
    let mut sink = |s: &DiagnosticSample| samples.push(s.clone());
    let exit = supervisor
        .run(TranscodeInvocation::new(script, vec![], hint), &mut sink, cancel)
        .await;
    (exit, samples)
}

#[tokio::test]
async fn test_streams_diagnostics_and_logs_them() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "ffmpeg",
        r#"echo "  Duration: 00:00:10.00, start: 0.000000" >&2
printf 'frame=1 time=00:00:02.50 speed=1x\rframe=2 time=00:00:07.00 speed=1x\r' >&2
echo "done" >&2
exit 0"#,
    );

    let (exit, samples) = run_script(&dir, &script, None, CancelSignal::new()).await;

    assert!(exit.success());
    assert_eq!(exit.total_duration, Some(10.0));
    let elapsed: Vec<f64> = samples.iter().filter_map(|s| s.elapsed).collect();
    assert_eq!(elapsed, vec![2.5, 7.0]);
    assert!(samples.iter().skip(1).all(|s| s.total == Some(10.0)));

    let log = std::fs::read_to_string(exit.log_path.expect("log path")).unwrap();
    assert!(log.contains("Duration: 00:00:10.00"));
    assert!(log.contains("time=00:00:07.00"));
    assert!(log.contains("done"));
}

#[tokio::test]
async fn test_nonzero_exit_code_is_reported() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ffmpeg", "echo 'Invalid data found' >&2\nexit 3");

    let (exit, samples) = run_script(&dir, &script, Some(4.0), CancelSignal::new()).await;

    assert_eq!(exit.code, 3);
    assert!(!exit.success());
    assert_eq!(exit.total_duration, Some(4.0));
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].line, "Invalid data found");
}

#[tokio::test]
async fn test_cancel_interrupts_child() {
    let dir = TempDir::new().unwrap();
    let script = write_script(
        dir.path(),
        "ffmpeg",
        r#"trap 'echo "Exiting normally, received signal 2." >&2; exit 255' INT
echo "time=00:00:01.00" >&2
while true; do sleep 0.05; done"#,
    );

    let cancel = CancelSignal::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(200)).await;
        trigger.cancel();
    });

    let (exit, samples) = tokio::time::timeout(
        Duration::from_secs(10),
        run_script(&dir, &script, None, cancel),
    )
    .await
    .expect("supervisor did not return after cancel");

    assert_eq!(exit.code, 255);
    assert!(samples.iter().any(|s| s.elapsed == Some(1.0)));
    let log = std::fs::read_to_string(exit.log_path.expect("log path")).unwrap();
    assert!(log.contains("received signal 2"));
}

#[tokio::test]
async fn test_missing_binary_is_launch_failure() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no-such-ffmpeg");

    let (exit, samples) = run_script(&dir, &missing, None, CancelSignal::new()).await;

    assert!(exit.launch_failed());
    assert!(samples.is_empty());
}

#[tokio::test]
async fn test_each_run_gets_its_own_log() {
    let dir = TempDir::new().unwrap();
    let script = write_script(dir.path(), "ffmpeg", "echo hello >&2");

    let (first, _) = run_script(&dir, &script, None, CancelSignal::new()).await;
    let (second, _) = run_script(&dir, &script, None, CancelSignal::new()).await;

    assert!(first.log_path.is_some());
    assert_ne!(first.log_path, second.log_path);
}
