// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The discover loop: repeatedly asks discovery for providers of the chain
//! ID and dials any not already seen. Grounded on `node/node.go`'s
//! `discoverPeers` goroutine.

use std::collections::HashSet;
use std::time::Duration;

use ck_core::ChainId;
use ck_discovery::DiscoveryNode;
use ck_node::NodeController;
use libp2p::PeerId;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::SupervisorError;

const ROUND_SLEEP: Duration = Duration::from_secs(5);

/// Runs until `token` is cancelled. Each round asks `discovery` for
/// providers of `chain_id`, dials every provider not already in `seen` via
/// `node.dial_seeds`, and records it only on success — a failed dial is
/// retried next round rather than permanently skipped.
pub async fn discover_loop(
    token: &CancellationToken,
    discovery: &DiscoveryNode,
    node: &NodeController,
    chain_id: &ChainId,
) -> Result<(), SupervisorError> {
    let mut seen: HashSet<PeerId> = HashSet::new();

    loop {
        match discovery.peers(chain_id).await {
            Ok(providers) => {
                for provider in providers {
                    if seen.contains(&provider) {
                        continue;
                    }
                    dial(discovery, node, provider, &mut seen).await;
                }
            }
            Err(err) => {
                warn!(chain_id = %chain_id, %err, "peer search failed, retrying");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(ROUND_SLEEP) => {}
            _ = token.cancelled() => return Err(SupervisorError::Cancelled),
        }
    }
}

/// Resolves `provider`'s advertised [`ck_core::PeerInfo`] and dials it.
/// Both the info lookup and the dial itself count as the "dial" — either
/// failing leaves `provider` unrecorded so it is retried next round.
async fn dial(
    discovery: &DiscoveryNode,
    node: &NodeController,
    provider: PeerId,
    seen: &mut HashSet<PeerId>,
) {
    let peer_info = match discovery.peer_info(provider).await {
        Ok(info) => info,
        Err(err) => {
            warn!(%provider, %err, "cannot retrieve peer info, will retry next round");
            return;
        }
    };

    match node.dial_seeds(&peer_info).await {
        Ok(()) => {
            info!(%provider, "dialed peer");
            seen.insert(provider);
        }
        Err(err) => {
            warn!(%provider, %err, "dial failed, will retry next round");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ck_core::ports::test_support::FakePortAllocator;
    use ck_core::{Manifest, PortAllocator, Project};
    use tempfile::tempdir;

    fn project(dir: &std::path::Path) -> Project {
        Project::new(
            Manifest::new("demo"),
            dir.to_path_buf(),
            FakePortAllocator::starting_at(42000).allocate().unwrap(),
        )
    }

    #[tokio::test]
    async fn cancellation_during_round_sleep_returns_promptly() {
        let discovery_dir = tempdir().unwrap();
        let discovery = DiscoveryNode::start(discovery_dir.path(), 0).await.unwrap();
        let project_dir = tempdir().unwrap();
        let node = NodeController::new(project(project_dir.path()));
        let chain_id = ChainId::new("QmTest");

        let token = CancellationToken::new();
        let child_token = token.clone();
        let handle = tokio::spawn(async move {
            discover_loop(&child_token, &discovery, &node, &chain_id).await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        token.cancel();

        let result = tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("loop did not return promptly after cancellation")
            .expect("task panicked");
        assert!(matches!(result, Err(SupervisorError::Cancelled)));
    }
}
