// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("failed to run the node container: {0}")]
    ContainerRun(#[from] ck_process::ProcessError),
}
