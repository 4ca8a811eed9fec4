//! # Request/Response Tracing
//!
//! `tower_http::trace::TraceLayer` configured for the coord API.

use axum::body::Body;
use axum::http::Request;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, MakeSpan, TraceLayer};
use tracing::{Level, Span};

/// Span factory recording method and raw path.
///
/// The raw path is the status key, so it is logged verbatim rather than as
/// a route template.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusSpan;

impl MakeSpan<Body> for StatusSpan {
    fn make_span(&mut self, request: &Request<Body>) -> Span {
        tracing::info_span!(
            "request",
            method = %request.method(),
            path = %request.uri().path(),
            query = request.uri().query().unwrap_or(""),
        )
    }
}

/// Build the `TraceLayer` wrapping every route.
pub fn layer(
) -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, StatusSpan, DefaultOnRequest, DefaultOnResponse>
{
    TraceLayer::new_for_http()
        .make_span_with(StatusSpan)
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_carries_request_fields() {
        let request = Request::builder()
            .uri("/job/a?wait=finished")
            .body(Body::empty())
            .unwrap();
        let _span = StatusSpan.make_span(&request);
    }

    #[test]
    fn layer_constructs_without_panic() {
        let _layer = layer();
    }
}
