//! Child process supervision for the external transcoder.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt, BufWriter};
use tokio::process::Command;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::lines::{parse_duration_marker, parse_elapsed_marker, LineSplitter};
use super::traits::{SampleSink, Transcoder};
use super::types::{
    CancelSignal, DiagnosticSample, ProcessExit, TranscodeInvocation, LAUNCH_FAILURE_CODE,
};
use crate::converter::ConverterConfig;
use crate::metrics;

const READ_CHUNK: usize = 8 * 1024;

/// How long to wait for buffered diagnostics after the process has exited.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Reported when the exit status itself could not be collected.
const WAIT_FAILURE_CODE: i32 = -2;

/// Runs a transcoder as a child process and streams its diagnostic output.
///
/// Stderr is read on a separate task, split into lines, appended to a
/// per-invocation log file and handed to the sink through a bounded channel.
#[derive(Debug, Clone)]
pub struct ProcessSupervisor {
    log_dir: PathBuf,
    buffer: usize,
}

impl ProcessSupervisor {
    /// Creates a supervisor writing logs to `log_dir`.
    pub fn new(log_dir: impl Into<PathBuf>, buffer: usize) -> Self {
        Self {
            log_dir: log_dir.into(),
            buffer: buffer.max(1),
        }
    }

    /// Creates a supervisor from converter settings.
    pub fn from_config(config: &ConverterConfig) -> Self {
        Self::new(config.log_dir.clone(), config.diagnostic_buffer)
    }

    fn next_log_path(&self) -> PathBuf {
        self.log_dir.join(format!("ffmpeg-{}.log", Uuid::new_v4()))
    }
}

#[async_trait]
impl Transcoder for ProcessSupervisor {
    fn name(&self) -> &str {
        "process"
    }

    async fn run(
        &self,
        invocation: TranscodeInvocation,
        sink: &mut dyn SampleSink,
        cancel: CancelSignal,
    ) -> ProcessExit {
        let log_path = self.next_log_path();
        let mut log = open_log(&log_path).await;
        let log_path = log.as_ref().map(|_| log_path);
        let hint = invocation.duration_hint.filter(|d| d.is_finite() && *d > 0.0);

        info!(
            "Launching {} with {} arguments",
            invocation.program.display(),
            invocation.args.len()
        );
        debug!("Transcoder arguments: {:?}", invocation.args);

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group: terminal signals reach the child only through cancel.
        #[cfg(unix)]
        command.process_group(0);
        let spawned = command.spawn();

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => {
                error!("Failed to launch {}: {}", invocation.program.display(), e);
                metrics::LAUNCH_FAILURES.inc();
                if let Some(writer) = log.as_mut() {
                    let message =
                        format!("failed to launch {}: {}", invocation.program.display(), e);
                    if append_line(writer, &message).await.is_ok() {
                        let _ = writer.flush().await;
                    }
                }
                return ProcessExit {
                    code: LAUNCH_FAILURE_CODE,
                    log_path,
                    total_duration: hint,
                };
            }
        };

        let pid = child.id();
        let (tx, mut rx) = mpsc::channel(self.buffer);
        let reader = match child.stderr.take() {
            Some(stderr) => tokio::spawn(pump_diagnostics(stderr, log, hint, tx)),
            None => tokio::spawn(pump_diagnostics(tokio::io::empty(), log, hint, tx)),
        };

        let mut interrupt_sent = false;
        let status = loop {
            tokio::select! {
                Some(sample) = rx.recv() => sink.on_sample(&sample),
                _ = cancel.cancelled(), if !interrupt_sent => {
                    interrupt_sent = true;
                    send_interrupt(pid);
                }
                status = child.wait() => break status,
            }
        };

        let abort = reader.abort_handle();
        let drained = tokio::time::timeout(DRAIN_TIMEOUT, async {
            while let Some(sample) = rx.recv().await {
                sink.on_sample(&sample);
            }
        })
        .await;
        if drained.is_err() {
            warn!("Diagnostic stream still open after exit, abandoning reader");
            abort.abort();
        }
        let total_duration = reader.await.unwrap_or(hint);

        let code = match status {
            Ok(status) => exit_code(status),
            Err(e) => {
                error!("Failed to collect exit status: {}", e);
                WAIT_FAILURE_CODE
            }
        };
        info!("{} exited with code {}", invocation.program.display(), code);

        ProcessExit {
            code,
            log_path,
            total_duration,
        }
    }
}

async fn open_log(path: &Path) -> Option<BufWriter<File>> {
    match File::create(path).await {
        Ok(file) => Some(BufWriter::new(file)),
        Err(e) => {
            warn!("Could not create diagnostic log {}: {}", path.display(), e);
            None
        }
    }
}

async fn append_line(writer: &mut BufWriter<File>, line: &str) -> std::io::Result<()> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await
}

async fn write_batch(writer: &mut BufWriter<File>, lines: &[String]) -> std::io::Result<()> {
    if lines.is_empty() {
        return Ok(());
    }
    for line in lines {
        append_line(writer, line).await?;
    }
    writer.flush().await
}

/// Reads the diagnostic stream to EOF. Returns the total duration as last known.
async fn pump_diagnostics<R>(
    mut stream: R,
    mut log: Option<BufWriter<File>>,
    mut total: Option<f64>,
    tx: mpsc::Sender<DiagnosticSample>,
) -> Option<f64>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let mut splitter = LineSplitter::new();
    let mut chunk = vec![0u8; READ_CHUNK];
    let mut dropped = 0u64;

    loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) => {
                warn!("Diagnostic stream read failed: {}", e);
                break;
            }
        };

        // Lines reach the log file before anyone sees them, so an aborted
        // reader loses at most the chunk in flight.
        let lines = splitter.push(&chunk[..n]);
        if let Some(writer) = log.as_mut() {
            if let Err(e) = write_batch(writer, &lines).await {
                warn!("Diagnostic log write failed, continuing without log: {}", e);
                log = None;
            }
        }

        for line in lines {
            if total.is_none() {
                if let Some(duration) = parse_duration_marker(&line) {
                    debug!("Discovered total duration: {:.2}s", duration);
                    total = Some(duration);
                }
            }

            let elapsed = parse_elapsed_marker(&line);
            let kind = if elapsed.is_some() { "progress" } else { "other" };
            metrics::DIAGNOSTIC_LINES.with_label_values(&[kind]).inc();

            match tx.try_send(DiagnosticSample {
                line,
                elapsed,
                total,
            }) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => dropped += 1,
                Err(TrySendError::Closed(_)) => {}
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} diagnostic samples while the consumer was busy", dropped);
    }

    if let Some(mut writer) = log {
        if let Some(rest) = splitter.remainder() {
            if let Err(e) = append_line(&mut writer, &rest).await {
                warn!("Diagnostic log write failed: {}", e);
            }
        }
        if let Err(e) = writer.flush().await {
            warn!("Diagnostic log flush failed: {}", e);
        }
    }

    total
}

#[cfg(unix)]
fn send_interrupt(pid: Option<u32>) {
    let Some(pid) = pid else {
        debug!("Process already reaped, nothing to interrupt");
        return;
    };
    let Ok(raw) = libc::pid_t::try_from(pid) else {
        warn!("Process id {} out of range, cannot interrupt", pid);
        return;
    };
    // SAFETY: kill(2) has no memory-safety preconditions.
    let rc = unsafe { libc::kill(raw, libc::SIGINT) };
    if rc == 0 {
        info!("Sent interrupt to process {}", pid);
    } else {
        warn!(
            "Failed to interrupt process {}: {}",
            pid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn send_interrupt(pid: Option<u32>) {
    warn!(
        "Interrupt is not supported on this platform, waiting for process {:?} to exit",
        pid
    );
}

fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }
    1
}
