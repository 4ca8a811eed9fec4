//! # coord-cli: Command-Line Interface for coord
//!
//! ## Subcommands
//!
//! - `coord serve`: run a coordination server.
//! - `coord status|wait`: read or await a path status.
//! - `coord start|finish|fail|set|rm`: publish a status change.
//!
//! ```bash
//! coord serve -s http://0.0.0.0:7500/ &
//! coord start /build/web && make web && coord finish /build/web || coord fail /build/web
//! coord wait /build/web succeeded && deploy-web
//! ```

pub mod serve;
pub mod status;

use tracing_subscriber::EnvFilter;

/// Log filter for `verbose` repetitions of `-v`, starting from `base`.
///
/// `RUST_LOG`, when set, takes precedence.
pub fn log_filter(verbose: u8, base: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level(verbose, base)))
}

fn level(verbose: u8, base: &str) -> &str {
    const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
    let start = LEVELS.iter().position(|l| *l == base).unwrap_or(1);
    let index = (start + usize::from(verbose)).min(LEVELS.len() - 1);
    LEVELS[index]
}
