// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `chainkit`: publishes or joins a peer-to-peer network for the project
//! in the current directory and runs its node until interrupted.
//!
//! A single process owns the [`ck_supervisor::Supervisor`] for the whole
//! run — there is no background daemon to talk to. Grounded on the
//! original `cmd/join.go`'s shape: spawn the run, `select` between its
//! completion and the process signals, call `Stop` on signal.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

mod exit_error;
mod logging;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::signal::unix::{signal, SignalKind};
use tracing::info;

use ck_core::ports::TcpPortAllocator;
use ck_core::{ChainId, Project};
use ck_supervisor::{Supervisor, SupervisorError};

use exit_error::ExitError;

#[derive(Parser)]
#[command(
    name = "chainkit",
    version,
    about = "Run and join peer-to-peer chainkit networks"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Publish this project's image and genesis, then run its node.
    Start {
        /// Join an existing network instead of publishing a new one.
        #[arg(long, value_name = "CHAIN_ID")]
        join: Option<String>,
    },
    /// Join an existing network by chain ID and run its node.
    Join {
        /// The chain ID to retrieve and join.
        chain_id: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(err) => {
            if !err.message.is_empty() {
                eprintln!("chainkit: {err}");
            }
            std::process::exit(err.code);
        }
    }
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let optional_chain_id = match &cli.command {
        Command::Start { join } => join.clone(),
        Command::Join { chain_id } => Some(chain_id.clone()),
    }
    .map(ChainId::new);

    let cwd: PathBuf = std::env::current_dir()?;
    let project = Project::load(&cwd, &TcpPortAllocator)?;
    project.materialize_dirs()?;

    let _log_guard = logging::init(&project.log_file())?;

    info!(project = project.name(), "starting");

    let supervisor = Arc::new(Supervisor::new());
    let run_supervisor = Arc::clone(&supervisor);
    let run_project = project.clone();
    let mut task = tokio::spawn(async move {
        run_supervisor.start(run_project, optional_chain_id, None).await
    });

    let mut sigterm = signal(SignalKind::terminate())?;

    let outcome = loop {
        tokio::select! {
            res = &mut task => break res,
            _ = tokio::signal::ctrl_c() => {
                info!("received interrupt, shutting down");
                supervisor.stop().await;
            }
            _ = sigterm.recv() => {
                info!("received terminate signal, shutting down");
                supervisor.stop().await;
            }
        }
    };

    // Exit 0 on a clean shutdown (signal-triggered cancellation included),
    // non-zero on an initialization failure or unrecoverable task error.
    match outcome {
        Ok(Ok(())) | Ok(Err(SupervisorError::Cancelled)) => Ok(()),
        Ok(Err(err)) => Err(ExitError::new(1, format!("{err}"))),
        Err(join_err) => Err(ExitError::new(1, format!("supervisor task panicked: {join_err}"))),
    }
}
