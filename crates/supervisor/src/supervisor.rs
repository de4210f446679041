// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `Supervisor`: the 8-step `Start` algorithm binding the discovery
//! server, the publisher/joiner, the node process controller, and the
//! announce/discover loops. Grounded on `node/node.go`'s `Node.Start`, with
//! the Go `errgroup` translated into a manual join over the three
//! hard-failing siblings (monitor, announce, discover): each is polled
//! until it completes, monitor's completion cancels the other two, and the
//! group only returns once every sibling has actually finished. A detached
//! best-effort explorer task rides alongside, matching the
//! background-task-with-shared-cancellation-token idiom from
//! `lifecycle/startup.rs`.

use std::sync::atomic::{AtomicBool, Ordering};

use ck_core::{ChainId, Project};
use ck_discovery::DiscoveryNode;
use ck_node::NodeController;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::announce::announce_loop;
use crate::discover::discover_loop;
use crate::error::SupervisorError;
use crate::network::establish_network;

/// Orchestrates one project's full lifecycle from a single `Start` call.
/// `Start` is single-shot: a second call on an already-started supervisor
/// returns [`SupervisorError::AlreadyStarted`] without disturbing the
/// first run.
pub struct Supervisor {
    token: CancellationToken,
    done_tx: watch::Sender<bool>,
    done_rx: watch::Receiver<bool>,
    started: AtomicBool,
}

impl Default for Supervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl Supervisor {
    pub fn new() -> Self {
        let (done_tx, done_rx) = watch::channel(false);
        Self {
            token: CancellationToken::new(),
            done_tx,
            done_rx,
            started: AtomicBool::new(false),
        }
    }

    /// Runs until every spawned task has returned: either because the
    /// daemon exited, every subsystem cooperated in a clean shutdown after
    /// [`Supervisor::stop`] was called, or an unrecoverable error occurred.
    pub async fn start(
        &self,
        project: Project,
        optional_chain_id: Option<ChainId>,
        optional_genesis: Option<Vec<u8>>,
    ) -> Result<(), SupervisorError> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(SupervisorError::AlreadyStarted);
        }

        let result = self.run(project, optional_chain_id, optional_genesis).await;
        let _ = self.done_tx.send(true);
        result
    }

    /// Cancels the root token and blocks until the in-flight `Start` call
    /// (if any) has fully wound down. A no-op if `Start` was never called
    /// or has already returned.
    pub async fn stop(&self) {
        self.token.cancel();
        let mut rx = self.done_rx.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                return;
            }
        }
    }

    async fn run(
        &self,
        project: Project,
        optional_chain_id: Option<ChainId>,
        optional_genesis: Option<Vec<u8>>,
    ) -> Result<(), SupervisorError> {
        let node = NodeController::new(project.clone());
        node.init(&self.token, optional_genesis.as_deref()).await?;

        let discovery =
            DiscoveryNode::start(&project.ipfs_dir(), project.ports.ipfs).await?;

        let result = self
            .run_online(&project, &node, &discovery, optional_chain_id)
            .await;

        discovery.stop().await;
        result
    }

    async fn run_online(
        &self,
        project: &Project,
        node: &NodeController,
        discovery: &DiscoveryNode,
        optional_chain_id: Option<ChainId>,
    ) -> Result<(), SupervisorError> {
        let chain_id = establish_network(&self.token, project, discovery, optional_chain_id).await?;

        node.start(&self.token).await?;
        let peer = node.peer_info().await?;

        let gctx = self.token.child_token();

        let explorer_token = gctx.clone();
        let explorer_project = project.clone();
        let explorer_handle = tokio::spawn(async move {
            if let Err(err) = ck_adapters::start_explorer(&explorer_token, &explorer_project).await
            {
                warn!(%err, "explorer exited with error");
            }
        });

        // Mirrors a Go errgroup more closely than `tokio::try_join!`: every
        // sibling is run to completion rather than abandoned the moment one
        // of them errors, so a daemon crash can't leave the discover loop's
        // child process believed-running when it has already been reaped.
        // Monitor completing (clean exit or crash) is the one event that
        // proactively tears the other two down; announce/discover finishing
        // never does, since they are retry-internal by design.
        let monitor_fut = async { node.wait().await.map_err(SupervisorError::from) };
        let announce_fut = announce_loop(&gctx, discovery, &chain_id, peer);
        let discover_fut = discover_loop(&gctx, discovery, node, &chain_id);
        tokio::pin!(monitor_fut);
        tokio::pin!(announce_fut);
        tokio::pin!(discover_fut);

        let mut monitor_res = None;
        let mut announce_res = None;
        let mut discover_res = None;

        while monitor_res.is_none() || announce_res.is_none() || discover_res.is_none() {
            tokio::select! {
                res = &mut monitor_fut, if monitor_res.is_none() => {
                    monitor_res = Some(res);
                    gctx.cancel();
                }
                res = &mut announce_fut, if announce_res.is_none() => {
                    announce_res = Some(res);
                }
                res = &mut discover_fut, if discover_res.is_none() => {
                    discover_res = Some(res);
                }
            }
        }

        // Whatever ended the hard group — success, an internal error, or
        // the root token already being cancelled — the explorer's own
        // loop only reacts to `gctx`, so it must be cancelled explicitly.
        gctx.cancel();
        let _ = explorer_handle.await;

        // The `while` loop above only exits once every slot is filled; the
        // `Ok(())` fallback is unreachable defensive plumbing, not a real
        // default, chosen over `.expect()` to keep this path panic-free.
        let monitor_res = monitor_res.unwrap_or(Ok(()));
        let announce_res = announce_res.unwrap_or(Ok(()));
        let discover_res = discover_res.unwrap_or(Ok(()));

        // The monitor's result dominates: a daemon crash is
        // reported even if the other two already unwound as `Cancelled`.
        // Otherwise the group's result is the first non-cancellation error
        // among the retry-internal siblings, else the cancellation itself.
        match monitor_res {
            Err(err) => Err(err),
            Ok(()) => announce_res.and(discover_res),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_start_call_is_rejected_without_disturbing_the_first() {
        let supervisor = Supervisor::new();
        supervisor.started.store(true, Ordering::SeqCst);

        let project = ck_core::Project::new(
            ck_core::Manifest::new("demo"),
            std::path::PathBuf::from("/tmp/demo-supervisor-test"),
            ck_core::ports::test_support::FakePortAllocator::starting_at(42000)
                .allocate()
                .unwrap(),
        );
        let err = supervisor.start(project, None, None).await.unwrap_err();
        assert!(matches!(err, SupervisorError::AlreadyStarted));
    }

    #[tokio::test]
    async fn stop_returns_immediately_when_start_was_never_called() {
        let supervisor = Supervisor::new();
        tokio::time::timeout(std::time::Duration::from_millis(200), supervisor.stop())
            .await
            .expect("stop() on a never-started supervisor should not block");
    }
}
