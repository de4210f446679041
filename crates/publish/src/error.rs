// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("cannot create sandbox directory {path}: {source}")]
    CreateSandbox {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Hard-linking a source file into the sandbox failed. This is never
    /// papered over by falling back to a copy: a silent copy would defeat
    /// the point of hard-linking a potentially multi-gigabyte image, and a
    /// cross-filesystem sandbox would fail differently (and later) anyway.
    #[error("cannot hard-link {source_path} into sandbox as {link_name}: {source}")]
    HardLink {
        source_path: PathBuf,
        link_name: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read sandbox member {path}: {source}")]
    ReadMember {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Discovery(#[from] ck_discovery::DiscoveryError),

    #[error("no providers found for chain {0}")]
    NoProviders(String),

    #[error("cannot write retrieved {what} to {path}: {source}")]
    WriteRetrieved {
        what: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode sandbox digest as a multihash: {0}")]
    Multihash(String),
}
