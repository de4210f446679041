// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The explorer sidecar (component C7): a best-effort `docker run`
//! of a pinned block-explorer image, published on the project's allocated
//! explorer port. Grounded on `node/explorer.go`.

use ck_core::Project;
use tokio::io::sink;
use tokio_util::sync::CancellationToken;

use crate::error::AdapterError;

/// Pinned explorer image, matching the original tool's choice exactly —
/// this sidecar is cosmetic and was never meant to track upstream.
pub const EXPLORER_IMAGE: &str = "samalba/cosmos-explorer-localdev:20181204";

/// Starts the explorer container. Runs to completion (or cancellation);
/// callers that want it to run alongside the node spawn this on its own
/// task.
pub async fn start_explorer(
    token: &CancellationToken,
    project: &Project,
) -> Result<(), AdapterError> {
    let container_name = format!("{}-explorer", project.image());
    let args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "--name".to_string(),
        container_name,
        "-p".to_string(),
        format!("{}:8080", project.ports.explorer),
        EXPLORER_IMAGE.to_string(),
    ];

    ck_process::run::<tokio::io::Empty, _, _>(token, "docker", &args, None, sink(), sink()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explorer_image_is_pinned() {
        assert_eq!(EXPLORER_IMAGE, "samalba/cosmos-explorer-localdev:20181204");
    }
}
