// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Saving the project's docker image to a temporary file ahead of
//! `Publish`, grounded on `node/node.go`'s
//! `createNetwork`, which does the equivalent with `ioutil.TempFile`.

use std::path::PathBuf;

use ck_core::Project;
use tokio_util::sync::CancellationToken;

use crate::error::SupervisorError;

/// Runs `docker save` into a uniquely-named file under the OS temp
/// directory. The `tempfile` crate is deliberately not used here — nothing
/// downstream needs its on-drop cleanup, since the file is immediately
/// handed to [`ck_publish::publish`], which hard-links it into the sandbox
/// directory and leaves the original where it is.
pub async fn save_image_to_tempfile(
    token: &CancellationToken,
    project: &Project,
) -> Result<PathBuf, SupervisorError> {
    let path = std::env::temp_dir().join(format!(
        "chainkit-{}-{}.tgz",
        project.name(),
        std::process::id()
    ));

    let file = tokio::fs::File::create(&path)
        .await
        .map_err(SupervisorError::TempFile)?;

    ck_adapters::docker_save(token, project, file)
        .await
        .map_err(|source| SupervisorError::SaveImage {
            path: path.clone(),
            source,
        })?;

    Ok(path)
}
