// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// Errors surfaced by [`crate::run`].
///
/// Cancellation is deliberately *not* a variant here: when the caller's
/// token fires, the child is signalled and its own exit (a `Spawn`-signal
/// exit status, normally non-zero) flows back through [`ProcessFailed`].
/// The caller distinguishes "I cancelled this" from "it failed on its own"
/// by checking the token, not by matching this enum.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to wait on {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with status {exit}: {stderr_tail}")]
    ProcessFailed {
        program: String,
        exit: String,
        stderr_tail: String,
    },

    #[error("failed to signal {program} (pid {pid}): {source}")]
    Signal {
        program: String,
        pid: i32,
        #[source]
        source: nix::errno::Errno,
    },

    #[error("{program}'s {stream} handle was not available after spawn")]
    MissingStdio { program: String, stream: &'static str },
}
