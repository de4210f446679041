// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Building the *sandbox* directory that `Publish` content-addresses: the
//! manifest, genesis, and image tarball hard-linked under canonical names
//! so a joiner can find them by name alone. Stage everything under one
//! directory before doing anything content-addressed with it.

use std::path::{Path, PathBuf};

use ck_core::{GENESIS_FILE, IMAGE_FILE, MANIFEST_FILE};

use crate::error::PublishError;

/// Hard-links `manifest_path`, `genesis_path`, `image_path` into a fresh
/// subdirectory of `sandbox_root` under their canonical names. Never falls
/// back to copying: a failed hard link (e.g. `sandbox_root` living on a
/// different filesystem than the image tarball) is reported to the caller
/// instead of silently duplicating a potentially multi-gigabyte file.
pub fn build_sandbox(
    sandbox_root: &Path,
    manifest_path: &Path,
    genesis_path: &Path,
    image_path: &Path,
) -> Result<PathBuf, PublishError> {
    std::fs::create_dir_all(sandbox_root).map_err(|source| PublishError::CreateSandbox {
        path: sandbox_root.to_path_buf(),
        source,
    })?;

    link_into(sandbox_root, manifest_path, MANIFEST_FILE)?;
    link_into(sandbox_root, genesis_path, GENESIS_FILE)?;
    link_into(sandbox_root, image_path, IMAGE_FILE)?;

    Ok(sandbox_root.to_path_buf())
}

fn link_into(
    sandbox_root: &Path,
    source_path: &Path,
    link_name: &'static str,
) -> Result<(), PublishError> {
    let dest = sandbox_root.join(link_name);
    // A prior attempt may have left a link behind; hard_link fails if the
    // destination already exists.
    let _ = std::fs::remove_file(&dest);
    std::fs::hard_link(source_path, &dest).map_err(|source| PublishError::HardLink {
        source_path: source_path.to_path_buf(),
        link_name,
        source,
    })
}
