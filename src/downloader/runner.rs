//! Child process execution with a wall-clock limit

use super::invocation::ToolInvocation;
use crate::error::{DownloadError, Error, Result};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tracing::{debug, warn};

/// Message used when a failing tool printed nothing at all
pub const GENERIC_FAILURE: &str = "download failed";

/// Captured result of a finished tool run
#[derive(Debug)]
pub struct ToolOutput {
    /// Exit status
    pub status: ExitStatus,
    /// Captured standard output
    pub stdout: Vec<u8>,
    /// Captured standard error
    pub stderr: Vec<u8>,
}

impl ToolOutput {
    /// Convert a non-zero exit into [`DownloadError::ToolFailed`]
    pub fn check(self) -> Result<Self> {
        if self.status.success() {
            return Ok(self);
        }
        Err(Error::Download(DownloadError::ToolFailed {
            message: failure_message(&self.stderr, &self.stdout),
            exit_code: self.status.code(),
        }))
    }
}

/// Run `invocation` inside `cwd`, killing it if it outlives `timeout`
pub async fn run(invocation: &ToolInvocation, cwd: &Path, timeout: Duration) -> Result<ToolOutput> {
    let mut child = Command::new(invocation.program())
        .args(invocation.args())
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            Error::ExternalTool(format!(
                "failed to execute {}: {}",
                invocation.program().display(),
                e
            ))
        })?;

    // Drain both pipes concurrently so a chatty tool never blocks on a full pipe
    let mut stdout_task = tokio::spawn(drain(child.stdout.take()));
    let mut stderr_task = tokio::spawn(drain(child.stderr.take()));

    // One deadline covers the process and its output; a forked helper that
    // keeps the pipes open must not stretch the limit
    let deadline = tokio::time::Instant::now() + timeout;

    let status = match tokio::time::timeout_at(deadline, child.wait()).await {
        Ok(status) => status?,
        Err(_) => {
            warn!(pid = ?child.id(), timeout = ?timeout, "downloader timed out, killing it");
            if let Err(e) = child.kill().await {
                warn!(error = %e, "failed to kill timed out downloader");
            }
            stdout_task.abort();
            stderr_task.abort();
            return Err(Error::Download(DownloadError::TimedOut { timeout }));
        }
    };

    let drained = tokio::time::timeout_at(deadline, async {
        let stdout = (&mut stdout_task).await.unwrap_or_default();
        let stderr = (&mut stderr_task).await.unwrap_or_default();
        (stdout, stderr)
    })
    .await;
    let (stdout, stderr) = match drained {
        Ok(output) => output,
        Err(_) => {
            warn!(
                code = ?status.code(),
                timeout = ?timeout,
                "downloader exited but its output stayed open past the deadline"
            );
            stdout_task.abort();
            stderr_task.abort();
            return Err(Error::Download(DownloadError::TimedOut { timeout }));
        }
    };

    debug!(
        code = ?status.code(),
        stdout_bytes = stdout.len(),
        stderr_bytes = stderr.len(),
        "downloader exited"
    );

    Ok(ToolOutput {
        status,
        stdout,
        stderr,
    })
}

async fn drain<R: AsyncRead + Unpin>(reader: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut reader) = reader
        && let Err(e) = reader.read_to_end(&mut buf).await
    {
        debug!(error = %e, "stopped reading tool output");
    }
    buf
}

/// Last non-empty line of stderr, else of stdout, else a generic message
pub fn failure_message(stderr: &[u8], stdout: &[u8]) -> String {
    last_line(stderr)
        .or_else(|| last_line(stdout))
        .unwrap_or_else(|| GENERIC_FAILURE.to_string())
}

fn last_line(output: &[u8]) -> Option<String> {
    String::from_utf8_lossy(output)
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty())
        .map(String::from)
}
