// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The container driver (component C2). Builds `docker` argument
//! vectors and delegates execution to [`ck_process::run`]; grounded on
//! `util/run.go`'s `DockerRun`/`DockerRunWithFD`.

use ck_core::Project;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;

use crate::error::AdapterError;

/// Builds the argument vector `util.DockerRun` used: the daemon binary's
/// state dir and the CLI's dir are bind-mounted into `/root/.{binary}`
/// inside the container, and the Tendermint P2P/RPC ports are published.
pub fn docker_run_args(project: &Project, extra_args: &[String]) -> Vec<String> {
    let daemon_dir_container = format!("/root/.{}", project.daemon_binary());
    let cli_dir_container = format!("/root/.{}", project.cli_binary());

    let mut args = vec![
        "run".to_string(),
        "--rm".to_string(),
        "-p".to_string(),
        format!("{}:26656", project.ports.tendermint_p2p),
        "-p".to_string(),
        format!("{}:26657", project.ports.tendermint_rpc),
        "-v".to_string(),
        format!("{}:{daemon_dir_container}", project.state_dir().display()),
        "-v".to_string(),
        format!("{}:{cli_dir_container}", project.cli_dir().display()),
        "--label".to_string(),
        "chainkit.cosmos.daemon".to_string(),
        "--label".to_string(),
        format!("chainkit.project={}", project.name()),
        format!("{}:latest", project.image()),
        project.daemon_binary().to_string(),
    ];
    args.extend_from_slice(extra_args);
    args
}

/// Runs the project's container with the given argument tail, forwarding
/// the provided stdio.
pub async fn docker_run<R, W1, W2>(
    token: &CancellationToken,
    project: &Project,
    extra_args: &[String],
    stdin: Option<R>,
    stdout: W1,
    stderr: W2,
) -> Result<std::process::ExitStatus, AdapterError>
where
    R: AsyncRead + Unpin + Send + 'static,
    W1: AsyncWrite + Unpin + Send + 'static,
    W2: AsyncWrite + Unpin + Send + 'static,
{
    let args = docker_run_args(project, extra_args);
    ck_process::run(token, "docker", &args, stdin, stdout, stderr)
        .await
        .map_err(AdapterError::from)
}

/// The argument vector for `docker load`, which reads the image tarball
/// from stdin rather than a file argument.
pub fn docker_load_args() -> Vec<String> {
    vec!["load".to_string()]
}

/// Runs `docker save {image}:latest`, streaming the tarball into `dest`.
/// Grounded on `node/node.go`'s `createNetwork`, which saves the image to a
/// temporary file before handing it to the publisher.
pub async fn docker_save<W>(
    token: &CancellationToken,
    project: &Project,
    dest: W,
) -> Result<std::process::ExitStatus, AdapterError>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    let args = vec!["save".to_string(), format!("{}:latest", project.image())];
    ck_process::run::<tokio::io::Empty, _, _>(token, "docker", &args, None, dest, tokio::io::stderr())
        .await
        .map_err(AdapterError::from)
}

/// Runs `docker load`, streaming the tarball from `src`. Used on the join
/// path to load a fetched bundle's image without buffering it on disk.
pub async fn docker_load<R>(
    token: &CancellationToken,
    src: R,
) -> Result<std::process::ExitStatus, AdapterError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    ck_process::run(
        token,
        "docker",
        &docker_load_args(),
        Some(src),
        tokio::io::sink(),
        tokio::io::stderr(),
    )
    .await
    .map_err(AdapterError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ck_core::ports::test_support::FakePortAllocator;
    use ck_core::{Manifest, PortAllocator};
    use std::path::PathBuf;

    fn project() -> Project {
        Project::new(
            Manifest::new("demo"),
            PathBuf::from("/tmp/demo"),
            FakePortAllocator::starting_at(42000).allocate().unwrap(),
        )
    }

    #[test]
    fn run_args_mount_state_and_cli_dirs_and_publish_p2p_rpc_ports() {
        let p = project();
        let args = docker_run_args(&p, &["start".to_string()]);
        assert_eq!(args[0], "run");
        assert!(args.contains(&"--rm".to_string()));
        assert!(args.contains(&format!("{}:26656", p.ports.tendermint_p2p)));
        assert!(args.contains(&format!("{}:26657", p.ports.tendermint_rpc)));
        assert!(args.iter().any(|a| a.contains("/root/.demod")));
        assert!(args.iter().any(|a| a.contains("/root/.democli")));
        assert_eq!(args.last(), Some(&"start".to_string()));

        let label_positions: Vec<usize> = args
            .iter()
            .enumerate()
            .filter(|(_, a)| *a == "--label")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(label_positions.len(), 2);
        assert_eq!(args[label_positions[0] + 1], "chainkit.cosmos.daemon");
        assert_eq!(args[label_positions[1] + 1], format!("chainkit.project={}", p.name()));
    }

    #[test]
    fn load_args_is_just_load() {
        assert_eq!(docker_load_args(), vec!["load".to_string()]);
    }
}
