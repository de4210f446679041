// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI help and version output.

use crate::common::{chainkit, TestProject};

#[test]
fn help_lists_both_subcommands() {
    let project = TestProject::empty();
    let output = chainkit(&project).arg("--help").output().expect("run chainkit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("start"));
    assert!(stdout.contains("join"));
}

#[test]
fn version_reports_the_package_version() {
    let project = TestProject::empty();
    let output = chainkit(&project).arg("--version").output().expect("run chainkit");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("chainkit"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn no_subcommand_exits_nonzero_with_usage() {
    let project = TestProject::empty();
    let output = chainkit(&project).output().expect("run chainkit");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage:"));
}
