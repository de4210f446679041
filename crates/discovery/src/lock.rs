// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive repo lock, the Rust equivalent of `fsrepo.LockedByOtherProcess`
//! (`discovery/discovery.go`). Grounded on `oj-daemon`'s
//! `startup.rs::try_lock_exclusive` PID-lock pattern: open without
//! truncating, lock, *then* write our PID.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::DiscoveryError;

const LOCK_FILE: &str = "repo.lock";

/// Holds the repo's exclusive lock for the lifetime of this value; dropping
/// it releases the lock (the OS does this automatically on fd close, but we
/// keep the handle alive explicitly so the lock's lifetime is obvious).
pub struct RepoLock {
    _file: File,
    path: PathBuf,
}

impl RepoLock {
    /// Acquires the exclusive lock on `repo_dir`'s lock file, creating
    /// `repo_dir` if it doesn't exist yet.
    pub fn acquire(repo_dir: &Path) -> Result<Self, DiscoveryError> {
        std::fs::create_dir_all(repo_dir).map_err(|source| DiscoveryError::Lock {
            path: repo_dir.display().to_string(),
            source,
        })?;
        let path = repo_dir.join(LOCK_FILE);

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| DiscoveryError::Lock {
                path: path.display().to_string(),
                source,
            })?;

        file.try_lock_exclusive()
            .map_err(|_| DiscoveryError::AlreadyLocked {
                path: path.display().to_string(),
            })?;

        let mut file = file;
        file.set_len(0).map_err(|source| DiscoveryError::Lock {
            path: path.display().to_string(),
            source,
        })?;
        writeln!(file, "{}", std::process::id()).map_err(|source| DiscoveryError::Lock {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self { _file: file, path })
    }
}

impl std::fmt::Debug for RepoLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepoLock").field("path", &self.path).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn second_acquire_on_same_dir_fails() {
        let dir = tempdir().unwrap();
        let _first = RepoLock::acquire(dir.path()).unwrap();
        let second = RepoLock::acquire(dir.path());
        assert!(matches!(second, Err(DiscoveryError::AlreadyLocked { .. })));
    }

    #[test]
    fn lock_is_released_on_drop() {
        let dir = tempdir().unwrap();
        {
            let _first = RepoLock::acquire(dir.path()).unwrap();
        }
        let second = RepoLock::acquire(dir.path());
        assert!(second.is_ok());
    }
}
