// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Join`: the reverse of `Publish` — find a provider of `chain_id` and
//! pull its bundle, writing the manifest and genesis to disk and the image
//! tarball to a file the caller streams into `DockerLoad`.

use std::path::{Path, PathBuf};

use ck_core::{ChainId, NetworkInfo, GENESIS_FILE, IMAGE_FILE, MANIFEST_FILE};
use ck_discovery::DiscoveryNode;
use tracing::info;

use crate::error::PublishError;

/// Finds a provider of `chain_id` and retrieves its bundle, writing the
/// manifest and genesis into `dest_dir` under their canonical names and
/// the image tarball alongside them. Fails with [`PublishError::NoProviders`]
/// if the discovery search (bounded by
/// [`ck_discovery::FIND_PROVIDERS_TIMEOUT`]) turns up nobody.
pub async fn join(
    discovery: &DiscoveryNode,
    chain_id: &ChainId,
    dest_dir: &Path,
) -> Result<NetworkInfo, PublishError> {
    let providers = discovery.peers(chain_id).await?;
    let peer = providers
        .first()
        .copied()
        .ok_or_else(|| PublishError::NoProviders(chain_id.to_string()))?;

    let bundle = discovery.fetch_bundle(peer, chain_id).await?;

    std::fs::create_dir_all(dest_dir).map_err(|source| PublishError::WriteRetrieved {
        what: "sandbox directory",
        path: dest_dir.to_path_buf(),
        source,
    })?;

    write_member(dest_dir, MANIFEST_FILE, &bundle.manifest)?;
    write_member(dest_dir, GENESIS_FILE, &bundle.genesis)?;
    let image_path = write_member(dest_dir, IMAGE_FILE, &bundle.image)?;

    info!(chain_id = %chain_id, peer = %peer, "joined chain");

    let image = std::fs::File::open(&image_path).map_err(|source| PublishError::WriteRetrieved {
        what: "image",
        path: image_path,
        source,
    })?;

    Ok(NetworkInfo {
        manifest: bundle.manifest,
        genesis: bundle.genesis,
        image: Box::new(image),
    })
}

fn write_member(dest_dir: &Path, name: &'static str, bytes: &[u8]) -> Result<PathBuf, PublishError> {
    let path = dest_dir.join(name);
    std::fs::write(&path, bytes).map_err(|source| PublishError::WriteRetrieved {
        what: name,
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
