// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Project`: the immutable, fully-resolved view of a chainkit project —
//! manifest fields plus every derived filesystem path and the port
//! allocation for this run. Grounded on `project/project.go` and
//! `config/config.go`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::manifest::Manifest;
use crate::ports::PortAllocation;

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error(transparent)]
    Manifest(#[from] crate::manifest::ManifestError),
    #[error(transparent)]
    Ports(#[from] crate::ports::PortsError),
}

/// A fully-resolved project: immutable once constructed.
#[derive(Debug, Clone)]
pub struct Project {
    pub manifest: Manifest,
    pub root_dir: PathBuf,
    pub ports: PortAllocation,
}

impl Project {
    pub fn new(manifest: Manifest, root_dir: PathBuf, ports: PortAllocation) -> Self {
        Self {
            manifest,
            root_dir,
            ports,
        }
    }

    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn image(&self) -> &str {
        &self.manifest.image
    }

    pub fn daemon_binary(&self) -> &str {
        &self.manifest.binaries.daemon
    }

    pub fn cli_binary(&self) -> &str {
        &self.manifest.binaries.cli
    }

    pub fn state_dir(&self) -> PathBuf {
        self.root_dir.join("state")
    }

    pub fn log_file(&self) -> PathBuf {
        self.state_dir().join("log")
    }

    pub fn data_dir(&self) -> PathBuf {
        self.state_dir().join("data")
    }

    pub fn config_dir(&self) -> PathBuf {
        self.state_dir().join("config")
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir().join("config.toml")
    }

    pub fn genesis_path(&self) -> PathBuf {
        self.config_dir().join("genesis.json")
    }

    pub fn cli_dir(&self) -> PathBuf {
        self.state_dir().join("cli")
    }

    pub fn ipfs_dir(&self) -> PathBuf {
        self.state_dir().join("ipfs")
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root_dir.join(crate::manifest::MANIFEST_FILE)
    }

    /// Creates every directory this project's state layout requires.
    pub fn materialize_dirs(&self) -> std::io::Result<()> {
        for dir in [self.config_dir(), self.data_dir(), self.cli_dir(), self.ipfs_dir()] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state_dir().exists()
    }

    /// Loads a project from `dir`, allocating a fresh port tuple.
    pub fn load(
        dir: &Path,
        allocator: &dyn crate::ports::PortAllocator,
    ) -> Result<Self, ProjectError> {
        let manifest = Manifest::load(dir)?;
        let ports = allocator.allocate()?;
        Ok(Self::new(manifest, dir.to_path_buf(), ports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::test_support::FakePortAllocator;
    use crate::ports::PortAllocator;

    fn project() -> Project {
        Project::new(
            Manifest::new("demo"),
            PathBuf::from("/tmp/demo"),
            FakePortAllocator::starting_at(42000).allocate().unwrap(),
        )
    }

    #[test]
    fn paths_are_rooted_at_root_dir() {
        let p = project();
        assert!(p.state_dir().starts_with(&p.root_dir));
        assert!(p.config_file().starts_with(&p.root_dir));
        assert!(p.genesis_path().starts_with(&p.root_dir));
        assert!(p.ipfs_dir().starts_with(&p.root_dir));
    }

    #[test]
    fn log_file_lives_under_state_dir() {
        let p = project();
        assert_eq!(p.log_file(), p.state_dir().join("log"));
    }
}
