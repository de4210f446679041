// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Publish`: stage the sandbox directory and content-address it. Callers
//! (the node supervisor) then pass the returned directory and `ChainId` to
//! `ck_discovery::DiscoveryNode::announce`.

use std::path::{Path, PathBuf};

use ck_core::ChainId;
use tracing::info;

use crate::chain_id::derive_chain_id;
use crate::error::PublishError;
use crate::sandbox::build_sandbox;

/// The outcome of staging and content-addressing a publish: the sandbox
/// directory backing the chain ID, kept alive for as long as the server
/// needs to serve it to other peers.
pub struct Published {
    pub chain_id: ChainId,
    pub sandbox_dir: PathBuf,
}

/// Hard-links `manifest_path`/`genesis_path`/`image_path` into a sandbox
/// directory under `sandbox_root`, then derives the `ChainId` that
/// content-addresses it.
pub fn publish(
    sandbox_root: &Path,
    manifest_path: &Path,
    genesis_path: &Path,
    image_path: &Path,
) -> Result<Published, PublishError> {
    let sandbox_dir = build_sandbox(sandbox_root, manifest_path, genesis_path, image_path)?;
    let chain_id = derive_chain_id(&sandbox_dir)?;
    info!(chain_id = %chain_id, dir = %sandbox_dir.display(), "published bundle");
    Ok(Published {
        chain_id,
        sandbox_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn publish_returns_chain_id_backed_by_sandbox_dir() {
        let src = tempdir().unwrap();
        let sandbox = tempdir().unwrap();
        let manifest = src.path().join("m.yml");
        let genesis = src.path().join("g.json");
        let image = src.path().join("i.tar");
        std::fs::write(&manifest, b"name: demo").unwrap();
        std::fs::write(&genesis, b"{}").unwrap();
        std::fs::write(&image, b"tarball").unwrap();

        let published = publish(sandbox.path(), &manifest, &genesis, &image).unwrap();
        assert!(published.sandbox_dir.join(ck_core::MANIFEST_FILE).exists());
        assert!(!published.chain_id.as_str().is_empty());
    }
}
