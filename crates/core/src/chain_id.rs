// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ChainId`: the content-address of a published `{manifest, genesis,
//! image}` directory. Serves as both the network identifier and the
//! retrieval key for `Join`.

use std::fmt;

/// A content identifier string, e.g. `/ipfs/Qm...`. Two identical published
/// triples always yield the same `ChainId` (content-address determinism).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChainId(String);

impl ChainId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The content-identifier segment, i.e. the last path component, as
    /// used to key DHT provide/find operations during `Announce`.
    pub fn cid_segment(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ChainId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ChainId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cid_segment_strips_path_prefix() {
        let id = ChainId::new("/ipfs/QmExample");
        assert_eq!(id.cid_segment(), "QmExample");
    }

    #[test]
    fn cid_segment_is_whole_string_without_slashes() {
        let id = ChainId::new("QmExample");
        assert_eq!(id.cid_segment(), "QmExample");
    }
}
