//! Client configuration.
//!
//! Points the client at a coord server. The server URL may carry a path
//! prefix; status keys are appended to it verbatim.

use std::time::Duration;

use url::Url;

/// Default server when nothing is configured.
pub const DEFAULT_SERVER: &str = "http://localhost:7500";

/// Default request timeout. Exceeds the server's default wait ceiling so a
/// long wait ends with the server's answer rather than a client timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 310;

/// Configuration for connecting to a coord server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Server URL including the mount prefix.
    pub base_url: Url,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// Configuration for `base_url` with the default timeout.
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `COORD_SERVER` (default: `http://localhost:7500`)
    /// - `COORD_TIMEOUT_SECS` (default: 310)
    pub fn from_env() -> Result<Self, ConfigError> {
        let raw = std::env::var("COORD_SERVER").unwrap_or_else(|_| DEFAULT_SERVER.to_string());
        let base_url = parse_server(&raw)?;
        let timeout_secs = match std::env::var("COORD_TIMEOUT_SECS") {
            Ok(value) => value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(value))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };
        Ok(Self {
            base_url,
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Parse a server URL, accepting only http and https.
pub fn parse_server(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| ConfigError::InvalidUrl(raw.to_string(), e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(
            raw.to_string(),
            format!("unsupported scheme '{other}'"),
        )),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid server URL {0}: {1}")]
    InvalidUrl(String, String),
    #[error("COORD_TIMEOUT_SECS must be a number of seconds, got '{0}'")]
    InvalidTimeout(String),
}
