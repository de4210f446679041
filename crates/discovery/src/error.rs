// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("repo at {path} is locked by another process")]
    AlreadyLocked { path: String },

    #[error("failed to acquire repo lock at {path}: {source}")]
    Lock {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error in content store: {0}")]
    Store(#[from] std::io::Error),

    #[error("invalid operation in state {state:?}: {op}")]
    InvalidState { state: &'static str, op: &'static str },

    #[error("failed to build libp2p transport/behaviour: {0}")]
    Transport(String),

    #[error("chain id {0:?} is not a valid content identifier")]
    BadChainId(String),

    #[error("find-providers timed out after {0:?} with no results")]
    FindProvidersTimedOut(std::time::Duration),

    #[error("discovery server already closed")]
    Closed,
}
