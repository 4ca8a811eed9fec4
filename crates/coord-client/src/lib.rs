//! # coord-client: Typed Client for a coord Server
//!
//! Reads, awaits, updates and removes path statuses over HTTP.
//!
//! ## Paths
//!
//! Status keys are appended to the server URL as given, so
//! `http://host:7500/coord` with key `/build/web` requests
//! `http://host:7500/coord/build/web`. A leading `/` is added when missing.
//!
//! ## Response Mapping
//!
//! | Status | Result                                      |
//! |--------|---------------------------------------------|
//! | 200    | the decoded status                          |
//! | 204    | success                                     |
//! | 404    | [`Status::Undefined`] on reads              |
//! | 408    | [`ClientError::WaitFailed`] on waits        |
//! | 409    | [`ClientError::Rejected`]                   |
//! | other  | [`ClientError::Api`]                        |

pub mod config;
pub mod error;

pub use config::ClientConfig;
pub use error::ClientError;

use coord_core::{Condition, Status, Transition};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use url::Url;

/// Body of a successful read.
#[derive(Debug, Deserialize)]
struct StatusMsg {
    status: Status,
}

/// Body of a write.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum WriteMsg {
    Status(Status),
    Action(Transition),
}

/// Error body returned by the server.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorMsg,
}

#[derive(Debug, Deserialize)]
struct ErrorMsg {
    message: String,
}

/// Client for one coord server.
#[derive(Debug, Clone)]
pub struct CoordClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CoordClient {
    /// Create a client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| ClientError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;
        Ok(Self {
            http,
            base_url: config.base_url,
        })
    }

    /// Create a client from `COORD_SERVER` and `COORD_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Current status of `path`. An unset path reads as [`Status::Undefined`].
    pub async fn status(&self, path: &str) -> Result<Status, ClientError> {
        let url = self.url_for(path)?;
        self.read(url).await
    }

    /// Block until `condition` holds for `path`, then return its status.
    ///
    /// Fails with [`ClientError::WaitFailed`] when the server gives up: the
    /// condition became impossible or its wait ceiling elapsed.
    pub async fn wait(&self, path: &str, condition: Condition) -> Result<Status, ClientError> {
        let mut url = self.url_for(path)?;
        url.query_pairs_mut().append_pair("wait", condition.as_str());
        tracing::debug!(%url, "waiting");

        match self.read(url).await {
            Err(ClientError::Api { status: 408, .. }) => Err(ClientError::WaitFailed {
                path: path.to_string(),
                condition,
            }),
            other => other,
        }
    }

    /// Apply a named transition.
    pub async fn update(&self, path: &str, transition: Transition) -> Result<(), ClientError> {
        self.write(path, &WriteMsg::Action(transition)).await
    }

    /// Assign a status unconditionally.
    pub async fn set(&self, path: &str, status: Status) -> Result<(), ClientError> {
        self.write(path, &WriteMsg::Status(status)).await
    }

    /// Remove `path`. Removing an unset path succeeds.
    pub async fn remove(&self, path: &str) -> Result<(), ClientError> {
        let url = self.url_for(path)?;
        let endpoint = url.to_string();
        let resp = self
            .http
            .delete(url)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        expect_success(resp).await
    }

    // -- internals ------------------------------------------------------

    async fn read(&self, url: Url) -> Result<Status, ClientError> {
        let endpoint = url.to_string();
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;

        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Status::Undefined);
        }
        if !resp.status().is_success() {
            return Err(error_from(resp).await);
        }
        let msg: StatusMsg = resp
            .json()
            .await
            .map_err(|e| ClientError::Deserialization {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        Ok(msg.status)
    }

    async fn write(&self, path: &str, body: &WriteMsg) -> Result<(), ClientError> {
        let url = self.url_for(path)?;
        let endpoint = url.to_string();
        tracing::debug!(%url, ?body, "writing status");
        let resp = self
            .http
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| ClientError::Http {
                endpoint: endpoint.clone(),
                source: e,
            })?;
        expect_success(resp).await
    }

    /// `path` appended to the base URL. `?` and `#` are escaped so they stay
    /// part of the key instead of starting a query or fragment.
    fn url_for(&self, path: &str) -> Result<Url, ClientError> {
        let path = path.replace('?', "%3F").replace('#', "%23");
        let base = self.base_url.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined).map_err(|e| ClientError::InvalidPath(path.to_string(), e.to_string()))
    }
}

async fn expect_success(resp: reqwest::Response) -> Result<(), ClientError> {
    if resp.status().is_success() {
        Ok(())
    } else {
        Err(error_from(resp).await)
    }
}

/// Map a non-2xx response to an error, preferring the server's message.
async fn error_from(resp: reqwest::Response) -> ClientError {
    let status = resp.status();
    let text = resp.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorEnvelope>(&text)
        .map(|envelope| envelope.error.message)
        .unwrap_or(text);

    if status == StatusCode::CONFLICT {
        ClientError::Rejected(message)
    } else {
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}
