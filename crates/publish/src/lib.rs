// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ck-publish: the Publisher/Joiner (component C4). Stages a
//! project's manifest, genesis, and image tarball into a content-addressed
//! sandbox directory on publish, and retrieves one back on join.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod chain_id;
mod error;
mod join;
mod publish;
mod sandbox;

pub use chain_id::derive_chain_id;
pub use error::PublishError;
pub use join::join;
pub use publish::{publish, Published};
pub use sandbox::build_sandbox;
