//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers via
//! the `State` extractor. Holds a handle to the status store and the server
//! configuration; both are cheap to clone.

use std::sync::Arc;
use std::time::Duration;

use coord_core::LocalState;

/// Longest a single `?wait=` request may block.
pub const DEFAULT_WAIT_CEILING: Duration = Duration::from_secs(300);

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// URL path under which status routes are mounted. `/` mounts at the root.
    pub mount_prefix: String,
    /// Upper bound on the duration of a `?wait=` request.
    pub wait_ceiling: Duration,
    /// Whether request metrics are recorded and `/_/metrics` is served.
    pub metrics_enabled: bool,
}

impl AppConfig {
    /// The mount prefix without trailing slashes, or `None` for the root.
    pub fn nest_path(&self) -> Option<String> {
        let trimmed = self.mount_prefix.trim_end_matches('/');
        if trimmed.is_empty() {
            return None;
        }
        if trimmed.starts_with('/') {
            Some(trimmed.to_string())
        } else {
            Some(format!("/{trimmed}"))
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mount_prefix: "/".to_string(),
            wait_ceiling: DEFAULT_WAIT_CEILING,
            metrics_enabled: true,
        }
    }
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: LocalState,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wrap a running store with the default configuration.
    pub fn new(store: LocalState) -> Self {
        Self::with_config(store, AppConfig::default())
    }

    pub fn with_config(store: LocalState, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}
