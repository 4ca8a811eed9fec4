//! # coord CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use url::Url;

use coord_cli::serve::{run_serve, ServeArgs};
use coord_cli::status::{run_status, StatusCommand};
use coord_client::config::{parse_server, DEFAULT_SERVER, DEFAULT_TIMEOUT_SECS};
use coord_client::{ClientConfig, CoordClient};

/// Coordinate independent jobs through a shared table of path statuses.
#[derive(Parser, Debug)]
#[command(name = "coord", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Server URL. For `serve`, the address to listen on and the mount prefix.
    #[arg(
        short,
        long,
        env = "COORD_SERVER",
        default_value = DEFAULT_SERVER,
        value_parser = parse_server,
        global = true
    )]
    server: Url,

    /// Client request timeout in seconds.
    #[arg(long, env = "COORD_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS, global = true)]
    timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a coordination server.
    Serve(ServeArgs),

    #[command(flatten)]
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let base = match cli.command {
        Commands::Serve(_) => "info",
        Commands::Status(_) => "warn",
    };
    tracing_subscriber::fmt()
        .with_env_filter(coord_cli::log_filter(cli.verbose, base))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(server = %cli.server, "coord CLI starting");

    let result = match &cli.command {
        Commands::Serve(args) => run_serve(args, &cli.server).await,
        Commands::Status(command) => {
            let config = ClientConfig {
                base_url: cli.server.clone(),
                timeout_secs: cli.timeout,
            };
            match CoordClient::new(config) {
                Ok(client) => run_status(command, &client).await,
                Err(e) => Err(e.into()),
            }
        }
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}
