// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum NodeError {
    #[error(transparent)]
    Container(#[from] ck_adapters::AdapterError),

    #[error("cannot determine local hostname: {0}")]
    Hostname(#[source] nix::errno::Errno),

    #[error("cannot fix ownership of mounted volumes: {0}")]
    Chown(#[source] ck_adapters::AdapterError),

    #[error("cannot read config file {path}: {source}")]
    ReadConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write config file {path}: {source}")]
    WriteConfig {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write genesis file {path}: {source}")]
    WriteGenesis {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot open log file {path}: {source}")]
    OpenLog {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("rpc request to {url} failed: {source}")]
    Rpc {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("dial_seeds request failed with status {0}")]
    DialSeedsFailed(u16),

    #[error("node process exited before becoming ready: {0}")]
    ExitedBeforeReady(String),

    #[error("cancelled before the node became ready")]
    Cancelled,
}
