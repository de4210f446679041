// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! An index from chain ID to the local sandbox directory that backs it.
//!
//! `ck-publish` builds the hard-linked sandbox directory and derives its
//! `ChainId`; this store is what the discovery server consults when it
//! needs to serve that directory's bytes to a peer that found us via the
//! DHT (`Announce`) or to read our own published bundle back (`Join` on a
//! chain we are ourselves providing).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use ck_core::{ChainId, GENESIS_FILE, IMAGE_FILE, MANIFEST_FILE};
use parking_lot::RwLock;

#[derive(Default)]
pub struct ContentStore {
    dirs: RwLock<HashMap<String, PathBuf>>,
}

impl ContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `dir` as the local source of truth for `chain_id`.
    pub fn register(&self, chain_id: &ChainId, dir: PathBuf) {
        self.dirs
            .write()
            .insert(chain_id.cid_segment().to_string(), dir);
    }

    /// Looks up the local directory for a chain ID, if we have one.
    pub fn resolve(&self, chain_id: &ChainId) -> Option<PathBuf> {
        self.dirs.read().get(chain_id.cid_segment()).cloned()
    }

    /// Reads the manifest and genesis bytes out of a registered bundle
    /// directory. The image is read separately, since the caller usually
    /// wants to stream rather than buffer it.
    pub fn read_metadata(dir: &Path) -> std::io::Result<(Vec<u8>, Vec<u8>)> {
        let manifest = std::fs::read(dir.join(MANIFEST_FILE))?;
        let genesis = std::fs::read(dir.join(GENESIS_FILE))?;
        Ok((manifest, genesis))
    }

    pub fn image_path(dir: &Path) -> PathBuf {
        dir.join(IMAGE_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registered_dir_resolves_by_cid_segment() {
        let store = ContentStore::new();
        let id = ChainId::new("/ipfs/QmExample");
        store.register(&id, PathBuf::from("/tmp/bundle"));
        assert_eq!(
            store.resolve(&ChainId::new("/ipfs/QmExample")),
            Some(PathBuf::from("/tmp/bundle"))
        );
    }

    #[test]
    fn unregistered_chain_id_resolves_to_none() {
        let store = ContentStore::new();
        assert_eq!(store.resolve(&ChainId::new("QmMissing")), None);
    }
}
