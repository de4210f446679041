// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `start`/`wait`/`peerInfo`/`dialSeeds`, grounded on `node/server.go`'s
//! `server` type. The background container task and the readiness poll
//! race each other exactly as `server.start` does with its `errCh`/`waitCh`
//! select, translated into a shared exit-outcome cell polled alongside the
//! RPC readiness probe instead of a Go channel select.

use std::sync::Arc;
use std::time::Duration;

use ck_core::Project;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::error::NodeError;
use crate::rpc::RpcClient;

/// Poll interval for the readiness probe (`node/server.go`'s `waitReady`).
pub const READY_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Poll interval used by [`NodeController::wait`] once the readiness race
/// is over and we're just watching for the container to exit.
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

#[derive(Debug, Clone)]
enum ExitOutcome {
    Success,
    Failed(String),
}

/// Controls one running daemon container: starting it, waiting on it, and
/// querying/mutating its membership via RPC.
pub struct NodeController {
    project: Project,
    rpc: RpcClient,
    exit: Arc<Mutex<Option<ExitOutcome>>>,
}

impl NodeController {
    pub fn new(project: Project) -> Self {
        let rpc = RpcClient::new(project.ports.tendermint_rpc);
        Self {
            project,
            rpc,
            exit: Arc::new(Mutex::new(None)),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Runs the one-time state bootstrap (see [`crate::init::init`]).
    pub async fn init(
        &self,
        token: &CancellationToken,
        optional_genesis: Option<&[u8]>,
    ) -> Result<(), NodeError> {
        crate::init::init(token, &self.project, optional_genesis).await
    }

    /// Spawns the daemon container in the background and blocks until the
    /// RPC endpoint answers, the container exits first, or `token` is
    /// cancelled.
    pub async fn start(&self, token: &CancellationToken) -> Result<(), NodeError> {
        let log_file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.project.log_file())
            .await
            .map_err(|source| NodeError::OpenLog {
                path: self.project.log_file().display().to_string(),
                source,
            })?;
        let stderr_file = log_file.try_clone().await.map_err(|source| NodeError::OpenLog {
            path: self.project.log_file().display().to_string(),
            source,
        })?;

        let project = self.project.clone();
        let token_for_task = token.clone();
        let exit = self.exit.clone();

        tokio::spawn(async move {
            let result = ck_adapters::docker_run::<tokio::io::Empty, _, _>(
                &token_for_task,
                &project,
                &["start".to_string()],
                None,
                log_file,
                stderr_file,
            )
            .await;

            // `docker_run` already turns a non-zero exit into an error, so
            // reaching `Ok` here always means the container exited clean.
            let outcome = match result {
                Ok(_) => ExitOutcome::Success,
                Err(err) => ExitOutcome::Failed(err.to_string()),
            };
            *exit.lock() = Some(outcome);
        });

        loop {
            if let Some(outcome) = self.exit.lock().clone() {
                return match outcome {
                    ExitOutcome::Success => Ok(()),
                    ExitOutcome::Failed(msg) => Err(NodeError::ExitedBeforeReady(msg)),
                };
            }

            if self.rpc.status().await.is_ok() {
                return Ok(());
            }

            tokio::select! {
                _ = tokio::time::sleep(READY_POLL_INTERVAL) => {}
                _ = token.cancelled() => return Err(NodeError::Cancelled),
            }
        }
    }

    /// Blocks until the container this controller started exits, returning
    /// its final outcome. Safe to call any number of times after `start`.
    pub async fn wait(&self) -> Result<(), NodeError> {
        loop {
            if let Some(outcome) = self.exit.lock().clone() {
                return match outcome {
                    ExitOutcome::Success => Ok(()),
                    ExitOutcome::Failed(msg) => Err(NodeError::ExitedBeforeReady(msg)),
                };
            }
            tokio::time::sleep(EXIT_POLL_INTERVAL).await;
        }
    }

    /// This daemon's own identity and advertised P2P port.
    pub async fn peer_info(&self) -> Result<ck_core::PeerInfo, NodeError> {
        self.rpc.peer_info(self.project.ports.tendermint_p2p).await
    }

    /// Adds `peer` to this daemon's seed list.
    pub async fn dial_seeds(&self, peer: &ck_core::PeerInfo) -> Result<(), NodeError> {
        self.rpc.dial_seeds(peer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ck_core::ports::test_support::FakePortAllocator;
    use ck_core::{Manifest, PortAllocator};

    fn project(dir: &std::path::Path) -> Project {
        Project::new(
            Manifest::new("demo"),
            dir.to_path_buf(),
            FakePortAllocator::starting_at(42000).allocate().unwrap(),
        )
    }

    #[tokio::test]
    async fn wait_reports_failure_recorded_by_background_task() {
        let dir = tempfile::tempdir().unwrap();
        let controller = NodeController::new(project(dir.path()));
        *controller.exit.lock() = Some(ExitOutcome::Failed("boom".to_string()));

        let err = controller.wait().await.unwrap_err();
        assert!(matches!(err, NodeError::ExitedBeforeReady(msg) if msg == "boom"));
    }

    #[tokio::test]
    async fn wait_reports_success_recorded_by_background_task() {
        let dir = tempfile::tempdir().unwrap();
        let controller = NodeController::new(project(dir.path()));
        *controller.exit.lock() = Some(ExitOutcome::Success);

        assert!(controller.wait().await.is_ok());
    }
}
