// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Peer metadata exchanged over the `/chainkit/0.1.0` application stream
//! and the transient bundle retrieved on join.

use serde::{Deserialize, Serialize};

/// A peer's daemon identity plus the P2P port it advertises. `ip` is
/// populated by the searcher from the DHT multiaddresses of the
/// advertising peer, never by the peer itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    #[serde(rename = "node_id")]
    pub node_id: String,
    #[serde(rename = "ips", default)]
    pub ip: Vec<String>,
    #[serde(rename = "tendermint_p2p_port")]
    pub tendermint_p2p_port: u16,
}

impl PeerInfo {
    pub fn new(node_id: impl Into<String>, tendermint_p2p_port: u16) -> Self {
        Self {
            node_id: node_id.into(),
            ip: Vec::new(),
            tendermint_p2p_port,
        }
    }
}

/// The three content-addressed objects retrieved on `Join`, before they are
/// written to disk / streamed into the container runtime.
pub struct NetworkInfo {
    pub manifest: Vec<u8>,
    pub genesis: Vec<u8>,
    /// A stream over the `image.tgz` bytes rather than a buffer — images can
    /// be gigabytes, so the joiner is expected to pipe this directly into
    /// `docker load` instead of buffering it.
    pub image: Box<dyn std::io::Read + Send>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_wire_field_names() {
        let mut peer = PeerInfo::new("abc123", 26656);
        peer.ip.push("10.0.0.1".to_string());
        let json = serde_json::to_string(&peer).unwrap();
        assert!(json.contains("\"node_id\":\"abc123\""));
        assert!(json.contains("\"ips\":[\"10.0.0.1\"]"));
        assert!(json.contains("\"tendermint_p2p_port\":26656"));
    }

    #[test]
    fn round_trips_json() {
        let peer = PeerInfo::new("abc123", 26656);
        let json = serde_json::to_string(&peer).unwrap();
        let back: PeerInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(peer, back);
    }
}
