// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ck-process: the Process Runner (component C1).
//!
//! Spawns a subprocess, forwards its stdio, and — on cancellation — sends a
//! soft termination signal, waits out a grace window, then escalates to a
//! hard kill. This is deliberately *not* `tokio::process::Command`'s
//! `kill_on_drop`/`CommandExt::wait`-with-`select!`-on-cancel, because an
//! immediate hard kill would leak any container the child itself manages
//! (the underlying container runtime needs the chance to tear its
//! containers down cleanly).

mod error;
mod runner;

pub use error::ProcessError;
pub use runner::{run, GRACE_PERIOD};
