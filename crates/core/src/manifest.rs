// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The project manifest (`chainkit.yml`): name, image, and the daemon/cli
//! binary names. Grounded on the original `project/project.go`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical manifest file name, part of both the local project layout and
/// the published content-addressed directory.
pub const MANIFEST_FILE: &str = "chainkit.yml";

/// Canonical genesis file name inside a published bundle directory.
pub const GENESIS_FILE: &str = "genesis.json";

/// Canonical image tarball name inside a published bundle directory
/// (`docker save` output).
pub const IMAGE_FILE: &str = "image.tgz";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binaries {
    pub cli: String,
    pub daemon: String,
}

/// The project manifest, serialized as YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub name: String,
    #[serde(default)]
    pub image: String,
    pub binaries: Binaries,
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("missing required field {0:?}")]
    MissingField(&'static str),
    #[error("cannot read manifest {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write manifest {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid manifest YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Manifest {
    /// Creates a manifest with the original tool's default binary naming
    /// convention (`{name}cli` / `{name}d`) and image tag (`chainkit-{name}`).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let mut m = Self {
            image: String::new(),
            binaries: Binaries {
                cli: format!("{name}cli"),
                daemon: format!("{name}d"),
            },
            name,
        };
        m.set_defaults();
        m
    }

    /// Fills in defaulted fields left blank by the caller.
    pub fn set_defaults(&mut self) {
        if self.image.is_empty() {
            self.image = format!("chainkit-{}", self.name);
        }
    }

    /// Sanity-checks the manifest's required fields.
    pub fn validate(&self) -> Result<(), ManifestError> {
        if self.name.is_empty() {
            return Err(ManifestError::MissingField("name"));
        }
        if self.image.is_empty() {
            return Err(ManifestError::MissingField("image"));
        }
        if self.binaries.cli.is_empty() {
            return Err(ManifestError::MissingField("binaries.cli"));
        }
        if self.binaries.daemon.is_empty() {
            return Err(ManifestError::MissingField("binaries.daemon"));
        }
        Ok(())
    }

    pub fn load(dir: &Path) -> Result<Self, ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        let data = std::fs::read_to_string(&path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut manifest: Manifest = serde_yaml::from_str(&data)?;
        manifest.set_defaults();
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn save(&self, dir: &Path) -> Result<(), ManifestError> {
        let path = dir.join(MANIFEST_FILE);
        let data = serde_yaml::to_string(self)?;
        std::fs::write(&path, data).map_err(|source| ManifestError::Write {
            path: path.display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn new_applies_original_naming_convention() {
        let m = Manifest::new("demo");
        assert_eq!(m.binaries.cli, "democli");
        assert_eq!(m.binaries.daemon, "demod");
        assert_eq!(m.image, "chainkit-demo");
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let mut m = Manifest::new("demo");
        m.binaries.daemon = String::new();
        assert!(matches!(
            m.validate(),
            Err(ManifestError::MissingField("binaries.daemon"))
        ));
    }

    #[test]
    fn round_trips_through_disk() {
        let dir = tempdir().unwrap();
        let m = Manifest::new("demo");
        m.save(dir.path()).unwrap();
        let loaded = Manifest::load(dir.path()).unwrap();
        assert_eq!(m, loaded);
    }
}
