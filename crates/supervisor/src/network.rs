// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step 4 of the supervisor's `Start` algorithm: either publish a new chain
//! or join one identified by a chain ID. Grounded on `node/node.go`'s
//! `createNetwork`.

use std::path::PathBuf;

use ck_core::{ChainId, Project};
use ck_discovery::DiscoveryNode;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::SupervisorError;
use crate::image::save_image_to_tempfile;

/// The directory a project's own bundle is staged and served from, and the
/// directory a joined bundle is retrieved into. Both roles share one path
/// per project: a node either serves what it published or what it joined,
/// never both.
fn bundle_dir(project: &Project) -> PathBuf {
    project.state_dir().join("publish")
}

/// Publishes a new chain (`optional_chain_id` is `None`) or joins an
/// existing one, returning the resulting chain ID either way. Registers the
/// resulting bundle directory with `discovery` so this node can serve it to
/// future joiners, regardless of which path was taken.
pub async fn establish_network(
    token: &CancellationToken,
    project: &Project,
    discovery: &DiscoveryNode,
    optional_chain_id: Option<ChainId>,
) -> Result<ChainId, SupervisorError> {
    match optional_chain_id {
        None => publish(token, project, discovery).await,
        Some(chain_id) => join(token, project, discovery, chain_id).await,
    }
}

async fn publish(
    token: &CancellationToken,
    project: &Project,
    discovery: &DiscoveryNode,
) -> Result<ChainId, SupervisorError> {
    let image_path = save_image_to_tempfile(token, project).await?;
    let dir = bundle_dir(project);

    let published = ck_publish::publish(
        &dir,
        &project.manifest_path(),
        &project.genesis_path(),
        &image_path,
    )?;

    discovery.register_content(&published.chain_id, published.sandbox_dir);
    info!(chain_id = %published.chain_id, "published new chain");
    Ok(published.chain_id)
}

async fn join(
    token: &CancellationToken,
    project: &Project,
    discovery: &DiscoveryNode,
    chain_id: ChainId,
) -> Result<ChainId, SupervisorError> {
    let dir = bundle_dir(project);
    let retrieved = ck_publish::join(discovery, &chain_id, &dir).await?;

    tokio::fs::write(project.manifest_path(), &retrieved.manifest)
        .await
        .map_err(|source| SupervisorError::OverwriteLocal {
            what: "manifest",
            path: project.manifest_path(),
            source,
        })?;
    tokio::fs::write(project.genesis_path(), &retrieved.genesis)
        .await
        .map_err(|source| SupervisorError::OverwriteLocal {
            what: "genesis",
            path: project.genesis_path(),
            source,
        })?;

    // `ck_publish::join` already wrote the image tarball under its
    // canonical name in `dir`; reopen it as an async file rather than
    // bridging `NetworkInfo::image`'s synchronous `Read` into
    // `docker_load`'s `AsyncRead` bound.
    let image_path = dir.join(ck_core::IMAGE_FILE);
    let image_file = tokio::fs::File::open(&image_path).await.map_err(|source| {
        SupervisorError::OverwriteLocal {
            what: "image",
            path: image_path,
            source,
        }
    })?;
    ck_adapters::docker_load(token, image_file)
        .await
        .map_err(SupervisorError::LoadImage)?;

    discovery.register_content(&chain_id, dir);
    info!(chain_id = %chain_id, "joined chain");
    Ok(chain_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundle_dir_is_rooted_under_state() {
        let project = ck_core::Project::new(
            ck_core::Manifest::new("demo"),
            PathBuf::from("/tmp/demo-project"),
            ck_core::ports::test_support::FakePortAllocator::starting_at(42000)
                .allocate()
                .unwrap(),
        );
        assert_eq!(bundle_dir(&project), project.state_dir().join("publish"));
    }
}
