//! # Operational Endpoints
//!
//! Health probes and the Prometheus scrape endpoint. They live under the
//! reserved `/_/` prefix, which status keys should avoid.

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Extension, Router};

use crate::middleware::metrics::ApiMetrics;
use crate::state::AppState;

/// Health probes.
pub fn health_router() -> Router<AppState> {
    Router::new()
        .route("/_/health/liveness", get(liveness))
        .route("/_/health/readiness", get(readiness))
}

/// Metrics scrape endpoint. Needs an [`ApiMetrics`] extension layer.
pub fn metrics_router() -> Router<AppState> {
    Router::new().route("/_/metrics", get(prometheus_metrics))
}

/// Liveness probe: 200 while the process serves HTTP.
async fn liveness() -> &'static str {
    "ok"
}

/// Readiness probe: 200 while the status store accepts commands, 503 after
/// it has been stopped.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    if state.store.is_running() {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "status store stopped")
    }
}

/// GET /_/metrics: refresh store gauges, then encode every metric.
async fn prometheus_metrics(
    State(state): State<AppState>,
    Extension(metrics): Extension<ApiMetrics>,
) -> impl IntoResponse {
    let snapshot = state.store.snapshot();
    metrics.set_store(snapshot.len(), state.store.generation());

    match metrics.gather_and_encode() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Failed to encode Prometheus metrics: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, e).into_response()
        }
    }
}
