// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Content-addressing a sandbox directory into a `ChainId`. The original
//! tool wraps the directory as a go-ipfs UnixFS node and uses the
//! resulting CID directly; we have no UnixFS here, so we hash the three
//! canonical members ourselves and wrap the digest as a CIDv1 over the
//! raw-binary multicodec. Two identical `{manifest, genesis, image}`
//! triples always hash to the same `ChainId`.

use std::path::Path;

use cid::Cid;
use ck_core::{ChainId, GENESIS_FILE, IMAGE_FILE, MANIFEST_FILE};
use multihash::Multihash;
use sha2::{Digest, Sha256};

use crate::error::PublishError;

/// Multicodec code for raw binary content.
const RAW_CODEC: u64 = 0x55;
/// Multihash function code for sha2-256.
const SHA2_256_CODE: u64 = 0x12;

/// Derives the `ChainId` for a sandbox directory built by
/// [`crate::sandbox::build_sandbox`]. Hashes the three canonical members in
/// a fixed order, each length-prefixed so distinct triples never collide on
/// concatenation boundaries.
pub fn derive_chain_id(sandbox_dir: &Path) -> Result<ChainId, PublishError> {
    let mut hasher = Sha256::new();
    for name in [MANIFEST_FILE, GENESIS_FILE, IMAGE_FILE] {
        let path = sandbox_dir.join(name);
        let bytes = std::fs::read(&path).map_err(|source| PublishError::ReadMember {
            path: path.clone(),
            source,
        })?;
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(&bytes);
    }
    let digest = hasher.finalize();

    let hash = Multihash::<64>::wrap(SHA2_256_CODE, &digest)
        .map_err(|e| PublishError::Multihash(e.to_string()))?;
    let cid = Cid::new_v1(RAW_CODEC, hash);

    Ok(ChainId::new(cid.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sandbox_with(manifest: &[u8], genesis: &[u8], image: &[u8]) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), manifest).unwrap();
        std::fs::write(dir.path().join(GENESIS_FILE), genesis).unwrap();
        std::fs::write(dir.path().join(IMAGE_FILE), image).unwrap();
        dir
    }

    #[test]
    fn identical_triples_yield_identical_chain_ids() {
        let a = sandbox_with(b"manifest", b"genesis", b"image");
        let b = sandbox_with(b"manifest", b"genesis", b"image");
        assert_eq!(
            derive_chain_id(a.path()).unwrap(),
            derive_chain_id(b.path()).unwrap()
        );
    }

    #[test]
    fn differing_content_yields_differing_chain_ids() {
        let a = sandbox_with(b"manifest", b"genesis", b"image-a");
        let b = sandbox_with(b"manifest", b"genesis", b"image-b");
        assert_ne!(
            derive_chain_id(a.path()).unwrap(),
            derive_chain_id(b.path()).unwrap()
        );
    }

    #[test]
    fn missing_member_is_reported() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join(MANIFEST_FILE), b"m").unwrap();
        std::fs::write(dir.path().join(GENESIS_FILE), b"g").unwrap();
        // image.tgz intentionally absent.
        assert!(matches!(
            derive_chain_id(dir.path()),
            Err(PublishError::ReadMember { .. })
        ));
    }
}
