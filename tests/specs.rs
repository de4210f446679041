// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace-level black-box specs, driving the compiled `chainkit`
//! binary end-to-end. Scenarios that require a live docker daemon or a
//! real libp2p network are covered as mocked unit tests inside
//! `ck-supervisor`, `ck-node`, and `ck-discovery` instead — this binary
//! only exercises the paths reachable without either.

#[path = "common/mod.rs"]
mod common;

#[path = "specs/mod.rs"]
mod specs;
