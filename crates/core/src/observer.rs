//! Output and exit observation for spawned workers.
//!
//! Each worker gets two line-drain tasks (stdout, stderr) and one exit
//! monitor. The drains forward worker output to the log continuously so a
//! full pipe can never stall the child; the monitor reaps the process and
//! retires the registry entry.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::{ChildStderr, ChildStdout};

use crate::registry::WorkerRegistry;
use crate::worker::{WorkerHandle, WorkerState};

/// How often the exit monitor polls for termination.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Attach output drains and the exit monitor to a registered handle.
pub(crate) fn attach(
    handle: Arc<WorkerHandle>,
    registry: Arc<WorkerRegistry>,
    stdout: Option<ChildStdout>,
    stderr: Option<ChildStderr>,
) {
    if let Some(stdout) = stdout {
        tokio::spawn(drain_lines(handle.pid, "stdout", stdout));
    }
    if let Some(stderr) = stderr {
        tokio::spawn(drain_lines(handle.pid, "stderr", stderr));
    }
    tokio::spawn(monitor_exit(handle, registry));
}

/// Forward one output stream to the log, line by line, until EOF.
///
/// Read failures are I/O diagnostics only; they never touch the registry.
async fn drain_lines<R>(pid: u32, stream: &'static str, reader: R)
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => tracing::info!(pid, stream, "{}", line),
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(pid, stream, error = %e, "worker output read failed");
                break;
            }
        }
    }
}

/// Wait for the worker to exit, then retire its registry entry.
///
/// The child is polled rather than awaited so the handle's `stop` path can
/// take the same lock to signal the process.
async fn monitor_exit(handle: Arc<WorkerHandle>, registry: Arc<WorkerRegistry>) {
    let status = loop {
        {
            let mut child = handle.child.lock().await;
            match child.as_mut() {
                None => return,
                Some(c) => match c.try_wait() {
                    Ok(Some(status)) => break status,
                    Ok(None) => {}
                    Err(e) => {
                        tracing::warn!(pid = handle.pid, error = %e, "failed to poll worker");
                        handle
                            .set_state(WorkerState::Failed(format!("wait failed: {}", e)))
                            .await;
                        registry.remove(handle.pid).await;
                        return;
                    }
                },
            }
        }
        tokio::time::sleep(EXIT_POLL_INTERVAL).await;
    };

    match status.code() {
        Some(code) => {
            handle.set_state(WorkerState::Exited(code)).await;
            tracing::info!(pid = handle.pid, code, "stream worker exited");
        }
        None => {
            let reason = signal_reason(&status);
            handle.set_state(WorkerState::Failed(reason.clone())).await;
            tracing::info!(pid = handle.pid, reason = %reason, "stream worker terminated by signal");
        }
    }
    registry.remove(handle.pid).await;
}

#[cfg(unix)]
fn signal_reason(status: &std::process::ExitStatus) -> String {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(sig) => format!("terminated by signal {}", sig),
        None => "terminated by signal".to_string(),
    }
}

#[cfg(not(unix))]
fn signal_reason(_status: &std::process::ExitStatus) -> String {
    "terminated without exit code".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drain_survives_eof_and_partial_lines() {
        // No trailing newline on the last chunk; the drain must still
        // consume everything and return at EOF.
        let data: &[u8] = b"frame 1 ok\nframe 2 ok\nshutting down";
        drain_lines(1234, "stdout", data).await;
    }
}
