// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Encoding for a node's `dial_seeds` RPC query parameter: a JSON array of
//! `"{node_id}@{ip}:{port}"` tuples. Percent-encoding of the resulting
//! string into the URL is left to the HTTP client (`reqwest`'s `.query()`
//! already does this), so this module only builds the JSON payload.

use ck_core::PeerInfo;

/// Builds the JSON array of seed tuples a node controller passes to its
/// managed process's `dial_seeds` endpoint.
pub fn encode_seeds(peers: &[PeerInfo]) -> String {
    let tuples: Vec<String> = peers
        .iter()
        .flat_map(|peer| {
            peer.ip
                .iter()
                .map(move |ip| format!("{}@{}:{}", peer.node_id, ip, peer.tendermint_p2p_port))
        })
        .collect();
    // A `Vec<String>` cannot fail to serialize; the fallback is unreachable.
    serde_json::to_string(&tuples).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_one_tuple_per_peer_ip() {
        let mut a = PeerInfo::new("nodeA", 26656);
        a.ip.push("10.0.0.1".to_string());
        let mut b = PeerInfo::new("nodeB", 26657);
        b.ip.push("10.0.0.2".to_string());
        b.ip.push("10.0.0.3".to_string());

        let encoded = encode_seeds(&[a, b]);
        let parsed: Vec<String> = serde_json::from_str(&encoded).unwrap();
        assert_eq!(
            parsed,
            vec![
                "nodeA@10.0.0.1:26656".to_string(),
                "nodeB@10.0.0.2:26657".to_string(),
                "nodeB@10.0.0.3:26657".to_string(),
            ]
        );
    }

    #[test]
    fn peers_with_no_ip_contribute_no_tuples() {
        let peer = PeerInfo::new("nodeC", 26658);
        let encoded = encode_seeds(&[peer]);
        assert_eq!(encoded, "[]");
    }
}
