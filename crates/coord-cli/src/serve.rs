//! # `coord serve`
//!
//! Runs a standalone coordination server. The global server URL doubles as
//! the listen address: its host and port are bound, its path becomes the
//! mount prefix of the status routes.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Args;
use url::Url;

use coord_api::state::{AppConfig, AppState};
use coord_core::LocalState;

/// Arguments for the `serve` subcommand.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Longest a `?wait=` request may block, in seconds.
    #[arg(long, env = "COORD_WAIT_TIMEOUT", default_value_t = 300)]
    pub wait_timeout: u64,

    /// Record request metrics and serve `/_/metrics`.
    #[arg(
        long,
        env = "COORD_METRICS_ENABLED",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    pub metrics: bool,
}

impl ServeArgs {
    /// Server configuration for the given listen URL.
    pub fn app_config(&self, server: &Url) -> AppConfig {
        AppConfig {
            mount_prefix: server.path().to_string(),
            wait_ceiling: Duration::from_secs(self.wait_timeout),
            metrics_enabled: self.metrics,
        }
    }
}

/// `host:port` to bind for `server`.
pub fn bind_address(server: &Url) -> Result<String> {
    let host = match server.host_str() {
        Some(host) => host,
        None => bail!("server URL {server} has no host"),
    };
    let port = server
        .port_or_known_default()
        .with_context(|| format!("server URL {server} has no port"))?;
    Ok(format!("{host}:{port}"))
}

/// Execute the `serve` subcommand. Returns once Ctrl-C has been received and
/// the store has stopped.
pub async fn run_serve(args: &ServeArgs, server: &Url) -> Result<u8> {
    let addr = bind_address(server)?;
    let config = args.app_config(server);
    tracing::debug!(?config, "server configuration");

    let store = LocalState::new();
    let state = AppState::with_config(store.clone(), config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("coord listening on {} (mount {})", addr, server.path());

    coord_api::serve(listener, state, shutdown_signal())
        .await
        .context("HTTP server failed")?;

    tracing::info!("HTTP server stopped");
    store.stop().await;
    Ok(0)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {e}");
        // Without a signal handler the server runs until killed.
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ServeArgs {
        ServeArgs {
            wait_timeout: 300,
            metrics: true,
        }
    }

    #[test]
    fn bind_address_uses_host_and_port() {
        let url: Url = "http://0.0.0.0:7500/coord".parse().unwrap();
        assert_eq!(bind_address(&url).unwrap(), "0.0.0.0:7500");
    }

    #[test]
    fn bind_address_defaults_port_from_scheme() {
        let url: Url = "http://localhost".parse().unwrap();
        assert_eq!(bind_address(&url).unwrap(), "localhost:80");
    }

    #[test]
    fn app_config_takes_prefix_from_path() {
        let url: Url = "http://localhost:7500/coord/".parse().unwrap();
        let config = args().app_config(&url);
        assert_eq!(config.mount_prefix, "/coord/");
        assert_eq!(config.nest_path().as_deref(), Some("/coord"));
        assert_eq!(config.wait_ceiling, Duration::from_secs(300));
    }

    #[test]
    fn root_url_mounts_at_root() {
        let url: Url = "http://localhost:7500".parse().unwrap();
        assert_eq!(args().app_config(&url).nest_path(), None);
    }
}
