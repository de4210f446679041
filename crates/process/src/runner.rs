// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::ProcessError;

/// How long a signalled child is given to exit cleanly before the runner
/// escalates to a hard kill.
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Bytes of stderr retained for [`ProcessError::ProcessFailed`]'s tail.
const STDERR_TAIL_CAP: usize = 4096;

/// Spawns `program` with `args`, forwards `stdin` to it (if any), tees its
/// stdout/stderr into the provided sinks, and returns its exit status.
///
/// On cancellation of `token` the child is sent `SIGTERM`; if it has not
/// exited within [`GRACE_PERIOD`] it is hard-killed. Either way `Run`
/// returns normally with whatever exit status that produced — a cancelled
/// run is not reported as a distinct error. Callers that need to know
/// "did I cancel this" check `token.is_cancelled()` themselves.
pub async fn run<R, W1, W2>(
    token: &CancellationToken,
    program: &str,
    args: &[String],
    stdin: Option<R>,
    stdout: W1,
    stderr: W2,
) -> Result<ExitStatus, ProcessError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W1: AsyncWrite + Unpin + Send + 'static,
    W2: AsyncWrite + Unpin + Send + 'static,
{
    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.stdin(if stdin.is_some() {
        std::process::Stdio::piped()
    } else {
        std::process::Stdio::null()
    });
    cmd.stdout(std::process::Stdio::piped());
    cmd.stderr(std::process::Stdio::piped());

    let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string(),
        source,
    })?;

    if let Some(mut src) = stdin {
        if let Some(mut sink) = child.stdin.take() {
            tokio::spawn(async move {
                if let Err(err) = tokio::io::copy(&mut src, &mut sink).await {
                    warn!(%err, "error forwarding stdin to child");
                }
                let _ = sink.shutdown().await;
            });
        }
    }

    let child_stdout = child.stdout.take().ok_or_else(|| ProcessError::MissingStdio {
        program: program.to_string(),
        stream: "stdout",
    })?;
    let child_stderr = child.stderr.take().ok_or_else(|| ProcessError::MissingStdio {
        program: program.to_string(),
        stream: "stderr",
    })?;

    let tail = Arc::new(Mutex::new(Vec::<u8>::new()));
    let stdout_task = tokio::spawn(copy_out(child_stdout, stdout, None));
    let stderr_task = tokio::spawn(copy_out(child_stderr, stderr, Some(tail.clone())));

    let status = wait_with_cancellation(&mut child, program, token).await?;

    let _ = stdout_task.await;
    let _ = stderr_task.await;

    if status.success() {
        Ok(status)
    } else {
        let stderr_tail = String::from_utf8_lossy(
            &tail.lock().unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
        .trim()
        .to_string();
        Err(ProcessError::ProcessFailed {
            program: program.to_string(),
            exit: format_exit(status),
            stderr_tail,
        })
    }
}

async fn wait_with_cancellation(
    child: &mut Child,
    program: &str,
    token: &CancellationToken,
) -> Result<ExitStatus, ProcessError> {
    tokio::select! {
        res = child.wait() => res.map_err(|source| ProcessError::Wait {
            program: program.to_string(),
            source,
        }),
        _ = token.cancelled() => {
            terminate_then_wait(child, program).await
        }
    }
}

async fn terminate_then_wait(
    child: &mut Child,
    program: &str,
) -> Result<ExitStatus, ProcessError> {
    if let Some(pid) = child.id() {
        debug!(pid, program, "sending SIGTERM on cancellation");
        if let Err(source) = signal::kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
            warn!(pid, program, %source, "SIGTERM delivery failed, will hard-kill after grace period");
        }
    }

    tokio::select! {
        res = child.wait() => res.map_err(|source| ProcessError::Wait {
            program: program.to_string(),
            source,
        }),
        _ = sleep(GRACE_PERIOD) => {
            warn!(program, "grace period elapsed, sending hard kill");
            child.kill().await.map_err(|source| ProcessError::Wait {
                program: program.to_string(),
                source,
            })?;
            child.wait().await.map_err(|source| ProcessError::Wait {
                program: program.to_string(),
                source,
            })
        }
    }
}

/// Copies `src` into `dst`, optionally also appending every chunk (capped)
/// into a shared tail buffer used for error reporting.
async fn copy_out<R, W>(mut src: R, mut dst: W, tail: Option<Arc<Mutex<Vec<u8>>>>)
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    use tokio::io::AsyncReadExt;

    let mut buf = [0u8; 4096];
    loop {
        let n = match src.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) => {
                warn!(%err, "error reading child output");
                break;
            }
        };
        if let Err(err) = dst.write_all(&buf[..n]).await {
            warn!(%err, "error writing child output to sink");
            break;
        }
        if let Some(tail) = &tail {
            let mut tail = tail.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            tail.extend_from_slice(&buf[..n]);
            if tail.len() > STDERR_TAIL_CAP {
                let excess = tail.len() - STDERR_TAIL_CAP;
                tail.drain(0..excess);
            }
        }
    }
    let _ = dst.flush().await;
}

fn format_exit(status: ExitStatus) -> String {
    match status.code() {
        Some(code) => code.to_string(),
        None => "signal".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::sink;

    #[tokio::test]
    async fn successful_command_returns_success_status() {
        let token = CancellationToken::new();
        let status = run::<tokio::io::Empty, _, _>(
            &token,
            "true",
            &[],
            None,
            sink(),
            sink(),
        )
        .await
        .unwrap();
        assert!(status.success());
    }

    #[tokio::test]
    async fn failing_command_reports_stderr_tail() {
        let token = CancellationToken::new();
        let err = run::<tokio::io::Empty, _, _>(
            &token,
            "sh",
            &["-c".to_string(), "echo boom 1>&2; exit 3".to_string()],
            None,
            sink(),
            sink(),
        )
        .await
        .unwrap_err();
        match err {
            ProcessError::ProcessFailed {
                exit, stderr_tail, ..
            } => {
                assert_eq!(exit, "3");
                assert!(stderr_tail.contains("boom"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancellation_terminates_child_and_returns_its_exit() {
        let token = CancellationToken::new();
        let child_token = token.clone();
        let handle = tokio::spawn(async move {
            run::<tokio::io::Empty, _, _>(
                &child_token,
                "sleep",
                &["30".to_string()],
                None,
                sink(),
                sink(),
            )
            .await
        });

        tokio::time::sleep(Duration::from_millis(100)).await;
        token.cancel();

        let status = handle
            .await
            .expect("task panicked")
            .expect("sleep should exit via signal, not error");
        assert!(!status.success());
    }
}
