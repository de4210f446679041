// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Initialization-failure exit codes: these all fail before any docker or
//! network interaction, so they are safe to run in any environment.

use crate::common::{chainkit, manifest_path, TestProject};

#[test]
fn start_without_a_manifest_exits_nonzero() {
    let project = TestProject::empty();
    let output = chainkit(&project).arg("start").output().expect("run chainkit");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&manifest_path(&project).display().to_string()));
}

#[test]
fn join_without_a_manifest_exits_nonzero() {
    let project = TestProject::empty();
    let output = chainkit(&project)
        .args(["join", "QmExampleChainId"])
        .output()
        .expect("run chainkit");
    assert!(!output.status.success());
}

#[test]
fn join_without_a_chain_id_argument_is_a_usage_error() {
    let project = TestProject::with_manifest("demo");
    let output = chainkit(&project).arg("join").output().expect("run chainkit");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
}
