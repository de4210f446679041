// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The announce loop: retries `Announce` every 5 seconds until it succeeds
//! once, then returns (the underlying stream handler stays installed for
//! the lifetime of the discovery server). Grounded on `node/node.go`'s
//! `announce` goroutine.

use std::time::Duration;

use ck_core::{ChainId, PeerInfo};
use ck_discovery::DiscoveryNode;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::SupervisorError;

const RETRY_INTERVAL: Duration = Duration::from_secs(5);

/// Calls `discovery.announce(chain_id, peer)` until it succeeds, logging
/// once on success and returning. On failure it logs and sleeps
/// [`RETRY_INTERVAL`] (cancellable) before retrying; retries are
/// indefinite until success or cancellation.
pub async fn announce_loop(
    token: &CancellationToken,
    discovery: &DiscoveryNode,
    chain_id: &ChainId,
    peer: PeerInfo,
) -> Result<(), SupervisorError> {
    loop {
        match discovery.announce(chain_id, peer.clone()).await {
            Ok(()) => {
                info!(chain_id = %chain_id, "announced to the network");
                return Ok(());
            }
            Err(err) => {
                warn!(chain_id = %chain_id, %err, "announce failed, retrying");
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(RETRY_INTERVAL) => {}
            _ = token.cancelled() => return Err(SupervisorError::Cancelled),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn returns_ok_once_announce_succeeds() {
        let dir = tempdir().unwrap();
        let node = DiscoveryNode::start(dir.path(), 0).await.unwrap();
        let token = CancellationToken::new();
        let chain_id = ChainId::new("QmTest");
        let peer = PeerInfo::new("node-1", 26656);

        let result = announce_loop(&token, &node, &chain_id, peer).await;
        assert!(result.is_ok());
        node.stop().await;
    }

    #[tokio::test]
    async fn cancellation_during_retry_sleep_returns_cancelled_well_under_the_interval() {
        // A stopped node's command channel is closed, so every `announce`
        // call fails and the loop always reaches the retry-sleep select.
        let dir = tempdir().unwrap();
        let node = DiscoveryNode::start(dir.path(), 0).await.unwrap();
        node.stop().await;

        let token = CancellationToken::new();
        let chain_id = ChainId::new("QmTest");
        let peer = PeerInfo::new("node-1", 26656);

        let child_token = token.clone();
        let handle = tokio::spawn(async move {
            announce_loop(&child_token, &node, &chain_id, peer).await
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
