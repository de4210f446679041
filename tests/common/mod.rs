// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixtures for the workspace's black-box CLI specs.

use std::path::PathBuf;

use assert_cmd::Command;
use tempfile::TempDir;

/// A scratch project directory, cleaned up on drop.
pub struct TestProject {
    dir: TempDir,
}

impl TestProject {
    /// An empty directory: no `chainkit.yml`, used to exercise the
    /// "no project here" failure path without touching docker or the
    /// network.
    pub fn empty() -> Self {
        Self {
            dir: TempDir::new().expect("tempdir"),
        }
    }

    /// A directory with a valid, minimal `chainkit.yml`.
    pub fn with_manifest(name: &str) -> Self {
        let project = Self::empty();
        let manifest = format!(
            "name: {name}\nimage: chainkit-{name}\nbinaries:\n  cli: {name}cli\n  daemon: {name}d\n"
        );
        std::fs::write(project.path().join("chainkit.yml"), manifest).expect("write manifest");
        project
    }

    pub fn path(&self) -> &std::path::Path {
        self.dir.path()
    }
}

/// Builds an `assert_cmd::Command` for the `chainkit` binary, rooted at
/// `project`'s directory.
pub fn chainkit(project: &TestProject) -> Command {
    let mut cmd = Command::cargo_bin("chainkit").expect("chainkit binary");
    cmd.current_dir(project.path());
    cmd
}

/// Resolves the workspace-relative manifest path, for specs that assert on
/// exact error text referencing it.
pub fn manifest_path(project: &TestProject) -> PathBuf {
    project.path().join("chainkit.yml")
}
