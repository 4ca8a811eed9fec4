//! # coord-api: HTTP Boundary for the Status Store
//!
//! Exposes a [`coord_core::LocalState`] over HTTP.
//!
//! ## API Surface
//!
//! | Route                      | Module                 | Purpose                    |
//! |----------------------------|------------------------|----------------------------|
//! | `{prefix}/*`               | [`routes::status`]     | status read/wait/write/rm  |
//! | `/_/health/liveness`       | [`routes::ops`]        | process liveness           |
//! | `/_/health/readiness`      | [`routes::ops`]        | store accepts commands     |
//! | `/_/metrics`               | [`routes::ops`]        | Prometheus scrape          |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! TraceLayer → MetricsMiddleware → Handler
//! ```

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod routes;
pub mod state;

use std::future::Future;

use axum::middleware::from_fn;
use axum::{Extension, Router};
use tokio::net::TcpListener;

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

pub use crate::error::AppError;
pub use crate::state::AppConfig;

/// Assemble the full application router with all routes and middleware.
pub fn app(state: AppState) -> Router {
    let status = match state.config.nest_path() {
        Some(prefix) => {
            tracing::info!(%prefix, "mounting status routes");
            Router::new().nest(&prefix, routes::status::router())
        }
        None => routes::status::router(),
    };

    let mut router = Router::new()
        .merge(routes::ops::health_router())
        .merge(status);

    let metrics = if state.config.metrics_enabled {
        match ApiMetrics::try_new() {
            Ok(metrics) => Some(metrics),
            Err(e) => {
                tracing::error!("metrics disabled, registry setup failed: {e}");
                None
            }
        }
    } else {
        None
    };

    if let Some(metrics) = metrics {
        router = router
            .merge(routes::ops::metrics_router())
            .layer(from_fn(middleware::metrics::metrics_middleware))
            .layer(Extension(metrics));
    }

    router
        .layer(middleware::tracing_layer::layer())
        .with_state(state)
}

/// Serve `state` on `listener` until `signal` resolves.
///
/// The store is stopped as soon as `signal` fires, before in-flight
/// requests are drained, so pending `?wait=` reads are released with 503
/// instead of holding shutdown until the wait ceiling.
pub async fn serve<F>(listener: TcpListener, state: AppState, signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = state.store.clone();
    let shutdown = async move {
        signal.await;
        tracing::info!("stopping status store");
        store.stop().await;
    };
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
}
