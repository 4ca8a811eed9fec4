//! # Status Subcommands
//!
//! Thin wrappers over [`CoordClient`]: each command performs one request
//! and prints the outcome.

use anyhow::Result;
use clap::Subcommand;

use coord_client::{ClientError, CoordClient};
use coord_core::{Condition, Status, Transition};

/// Subcommands that talk to a running server.
#[derive(Subcommand, Debug)]
pub enum StatusCommand {
    /// Print the status of a path.
    Status {
        /// Status key, e.g. `/build/web`.
        path: String,
    },

    /// Block until a path meets a condition; exit 1 if it never can.
    Wait {
        path: String,
        /// One of: started, succeeded, failed, running, finished.
        condition: Condition,
    },

    /// Mark a path as started.
    Start { path: String },

    /// Mark a started path as succeeded.
    Finish { path: String },

    /// Mark a path as failed.
    Fail { path: String },

    /// Assign a status unconditionally.
    Set {
        path: String,
        /// One of: undefined, started, succeeded, failed.
        status: Status,
    },

    /// Forget a path.
    #[command(alias = "remove")]
    Rm { path: String },
}

/// Execute a status subcommand against `client`.
pub async fn run_status(command: &StatusCommand, client: &CoordClient) -> Result<u8> {
    match command {
        StatusCommand::Status { path } => {
            let status = client.status(path).await?;
            println!("{status}");
            Ok(0)
        }
        StatusCommand::Wait { path, condition } => match client.wait(path, *condition).await {
            Ok(status) => {
                println!("{status}");
                Ok(0)
            }
            Err(err @ ClientError::WaitFailed { .. }) => {
                eprintln!("{err}");
                Ok(1)
            }
            Err(err) => Err(err.into()),
        },
        StatusCommand::Start { path } => transition(client, path, Transition::Start).await,
        StatusCommand::Finish { path } => transition(client, path, Transition::Finish).await,
        StatusCommand::Fail { path } => transition(client, path, Transition::Fail).await,
        StatusCommand::Set { path, status } => {
            client.set(path, *status).await?;
            tracing::info!(%path, %status, "status assigned");
            Ok(0)
        }
        StatusCommand::Rm { path } => {
            client.remove(path).await?;
            tracing::info!(%path, "path removed");
            Ok(0)
        }
    }
}

async fn transition(client: &CoordClient, path: &str, transition: Transition) -> Result<u8> {
    client.update(path, transition).await?;
    tracing::info!(%path, %transition, "update applied");
    Ok(0)
}
