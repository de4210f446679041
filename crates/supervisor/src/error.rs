// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("supervisor already started")]
    AlreadyStarted,

    #[error(transparent)]
    Node(#[from] ck_node::NodeError),

    #[error(transparent)]
    Discovery(#[from] ck_discovery::DiscoveryError),

    #[error(transparent)]
    Publish(#[from] ck_publish::PublishError),

    #[error("cannot save image to {path}: {source}")]
    SaveImage {
        path: std::path::PathBuf,
        #[source]
        source: ck_adapters::AdapterError,
    },

    #[error("cannot create temporary file for image save: {0}")]
    TempFile(#[source] std::io::Error),

    #[error("cannot load fetched image into the container runtime: {0}")]
    LoadImage(#[source] ck_adapters::AdapterError),

    #[error("cannot overwrite local {what} at {path}: {source}")]
    OverwriteLocal {
        what: &'static str,
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cancelled")]
    Cancelled,
}
