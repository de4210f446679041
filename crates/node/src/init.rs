// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `init`: the daemon's state bootstrap. The container-init retry is
//! grounded on `node/init.go`'s two-phase moniker retry; the permission
//! fix has no original counterpart (bind-mounted container output here
//! needs a chown the original's native process never did) and the
//! config-override step reuses `node/init.go`'s `updateConfig` call,
//! which runs unconditionally on every `init`, not just the first.

use ck_core::Project;
use nix::unistd::{getgid, getuid};
use tokio_util::sync::CancellationToken;

use crate::config::{apply_overrides, write_genesis};
use crate::error::NodeError;

/// Runs `{daemon} init` in the container if the project's state directory
/// doesn't exist yet; some daemons (e.g. Cosmos SDK apps) reject a bare
/// `init` and require an explicit `--moniker`, so a failure is retried once
/// with the local hostname before being treated as fatal.
async fn run_daemon_init(token: &CancellationToken, project: &Project) -> Result<(), NodeError> {
    if project.is_initialized() {
        return Ok(());
    }

    let first = ck_adapters::docker_run::<tokio::io::Empty, _, _>(
        token,
        project,
        &["init".to_string()],
        None,
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await;

    if first.is_ok() {
        return Ok(());
    }

    let hostname = hostname()?;
    ck_adapters::docker_run::<tokio::io::Empty, _, _>(
        token,
        project,
        &["init".to_string(), "--moniker".to_string(), hostname],
        None,
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await
    .map(|_| ())
    .map_err(NodeError::from)
}

/// Runs a one-shot root container that `chown -R`s the mounted state/cli
/// directories to the caller's uid/gid. Without this, the daemon
/// subsequently runs as whatever uid the image defaults to and leaves
/// files the host user can't read.
async fn fix_ownership(token: &CancellationToken, project: &Project) -> Result<(), NodeError> {
    let uid = getuid();
    let gid = getgid();
    let daemon_dir_container = format!("/root/.{}", project.daemon_binary());
    let cli_dir_container = format!("/root/.{}", project.cli_binary());

    let args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "-v".to_string(),
        format!("{}:{daemon_dir_container}", project.state_dir().display()),
        "-v".to_string(),
        format!("{}:{cli_dir_container}", project.cli_dir().display()),
        "--entrypoint".to_string(),
        "chown".to_string(),
        format!("{}:latest", project.image()),
        "-R".to_string(),
        format!("{uid}:{gid}"),
        daemon_dir_container,
        cli_dir_container,
    ];

    ck_process::run::<tokio::io::Empty, _, _>(
        token,
        "docker",
        &args,
        None,
        tokio::io::stdout(),
        tokio::io::stderr(),
    )
    .await
    .map(|_| ())
    .map_err(|source| NodeError::Chown(ck_adapters::AdapterError::from(source)))
}

fn hostname() -> Result<String, NodeError> {
    nix::unistd::gethostname()
        .map_err(NodeError::Hostname)
        .map(|s| s.to_string_lossy().into_owned())
}

/// Full `init` sequence: bootstrap state if the state directory is
/// absent, then unconditionally fix permissions and reapply config
/// overrides on every call, optionally overwriting genesis.
pub async fn init(
    token: &CancellationToken,
    project: &Project,
    optional_genesis: Option<&[u8]>,
) -> Result<(), NodeError> {
    project
        .materialize_dirs()
        .map_err(|source| NodeError::WriteConfig {
            path: project.state_dir().display().to_string(),
            source,
        })?;

    run_daemon_init(token, project).await?;

    fix_ownership(token, project).await?;
    let moniker = hostname()?;
    apply_overrides(&project.config_file(), &moniker)?;

    if let Some(genesis) = optional_genesis {
        write_genesis(&project.genesis_path(), genesis)?;
    }

    Ok(())
}
