// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A thin client over the daemon's Tendermint-style RPC, grounded on
//! `node/server.go`'s `server` type: `Status()` for readiness/peer info,
//! `dial_seeds` for membership.

use ck_core::PeerInfo;
use serde::Deserialize;

use crate::error::NodeError;

#[derive(Debug, Deserialize)]
struct StatusResponse {
    result: StatusResult,
}

#[derive(Debug, Deserialize)]
struct StatusResult {
    node_info: NodeInfo,
}

#[derive(Debug, Deserialize)]
struct NodeInfo {
    id: String,
}

/// Long-lived HTTP client targeting `localhost:{rpc_port}`.
pub struct RpcClient {
    base_url: String,
    client: reqwest::Client,
}

impl RpcClient {
    pub fn new(rpc_port: u16) -> Self {
        Self {
            base_url: format!("http://localhost:{rpc_port}"),
            client: reqwest::Client::new(),
        }
    }

    /// `GET /status`. Any non-success response (connection refused while
    /// the daemon is still starting, non-2xx once it answers) is an error —
    /// callers use this purely as a readiness probe.
    pub async fn status(&self) -> Result<(), NodeError> {
        self.status_node_id().await.map(|_| ())
    }

    async fn status_node_id(&self) -> Result<String, NodeError> {
        let url = format!("{}/status", self.base_url);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| NodeError::Rpc {
                url: url.clone(),
                source,
            })?
            .error_for_status()
            .map_err(|source| NodeError::Rpc {
                url: url.clone(),
                source,
            })?;
        let status: StatusResponse = resp.json().await.map_err(|source| NodeError::Rpc {
            url,
            source,
        })?;
        Ok(status.result.node_info.id)
    }

    /// `peerInfo`: this daemon's own identity plus the P2P port it
    /// advertises. `IP[]` is left empty — the searcher fills it in.
    pub async fn peer_info(&self, tendermint_p2p_port: u16) -> Result<PeerInfo, NodeError> {
        let node_id = self.status_node_id().await?;
        Ok(PeerInfo::new(node_id, tendermint_p2p_port))
    }

    /// `dialSeeds`: `GET /dial_seeds?seeds=["id@ip:port", ...]`, one seed
    /// per advertised IP.
    pub async fn dial_seeds(&self, peer: &PeerInfo) -> Result<(), NodeError> {
        let seed_string = ck_wire::encode_seeds(std::slice::from_ref(peer));

        let url = format!("{}/dial_seeds", self.base_url);
        let resp = self
            .client
            .get(&url)
            .query(&[("seeds", seed_string)])
            .send()
            .await
            .map_err(|source| NodeError::Rpc {
                url: url.clone(),
                source,
            })?;

        if !resp.status().is_success() {
            return Err(NodeError::DialSeedsFailed(resp.status().as_u16()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_targets_localhost_rpc_port() {
        let client = RpcClient::new(42001);
        assert_eq!(client.base_url, "http://localhost:42001");
    }
}
