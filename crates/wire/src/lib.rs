// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-the-wire formats shared by the discovery, publish, and node
//! components: the length-prefixed framing used by content transfer, the
//! single-shot peer-info exchange on `/chainkit/0.1.0`, and the seed-list
//! encoding passed to a node's `dial_seeds` RPC.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod framing;
mod peer_stream;
mod seeds;

pub use framing::{decode, encode, read_message, write_message, WireError};
pub use peer_stream::{read_peer_info, write_peer_info, PEER_INFO_PROTOCOL};
pub use seeds::encode_seeds;
