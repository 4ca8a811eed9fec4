//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps store and decode errors from coord-core to HTTP status codes and
//! returns JSON bodies with a machine-readable code and a message.
//! Internal error details never reach the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use coord_core::{DecodeError, StoreError, TransitionError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "CONFLICT").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Structured context. A 409 carries the rejected `update` and the
    /// status it was attempted `from`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// No status is published for the path (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed body, unknown status, update or predicate name (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The update is not legal from the current status (409).
    #[error("conflict: {0}")]
    Conflict(TransitionError),

    /// A wait ended without its condition being met (408).
    #[error("request timeout: {0}")]
    RequestTimeout(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),

    /// The status store is stopped (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::RequestTimeout(_) => (StatusCode::REQUEST_TIMEOUT, "REQUEST_TIMEOUT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let details = match &self {
            Self::Conflict(rejected) => Some(serde_json::json!({
                "update": rejected.update,
                "from": rejected.from.as_str(),
            })),
            _ => None,
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DecodeError> for AppError {
    fn from(err: DecodeError) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Transition(rejected) => Self::Conflict(rejected),
            StoreError::Fault(_) => Self::Internal(err.to_string()),
            StoreError::Shutdown => Self::ServiceUnavailable(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coord_core::{Status, TransitionError};
    use http_body_util::BodyExt;

    async fn body_json(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn status_codes() {
        let cases = [
            (AppError::NotFound("x".into()), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::BadRequest("x".into()), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (
                AppError::Conflict(TransitionError::new("x", Status::Failed)),
                StatusCode::CONFLICT,
                "CONFLICT",
            ),
            (
                AppError::RequestTimeout("x".into()),
                StatusCode::REQUEST_TIMEOUT,
                "REQUEST_TIMEOUT",
            ),
            (
                AppError::Internal("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
            ),
            (
                AppError::ServiceUnavailable("x".into()),
                StatusCode::SERVICE_UNAVAILABLE,
                "SERVICE_UNAVAILABLE",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code), "{err}");
        }
    }

    #[test]
    fn store_errors_map_to_http_semantics() {
        let rejected = StoreError::from(TransitionError::new("fail", Status::Succeeded));
        assert!(matches!(AppError::from(rejected), AppError::Conflict(_)));
        assert!(matches!(
            AppError::from(StoreError::Fault("boom".into())),
            AppError::Internal(_)
        ));
        assert!(matches!(
            AppError::from(StoreError::Shutdown),
            AppError::ServiceUnavailable(_)
        ));
    }

    #[test]
    fn decode_errors_are_bad_requests() {
        let err = AppError::from(DecodeError::UnknownStatus("done".into()));
        assert!(matches!(err, AppError::BadRequest(ref m) if m.contains("done")));
    }

    #[tokio::test]
    async fn internal_message_is_hidden() {
        let (status, body) = body_json(AppError::Internal("secret panic text".into())).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(body["error"]["message"], "An internal error occurred");
        assert!(body["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn conflict_message_is_returned() {
        let err = AppError::from(StoreError::from(TransitionError::new(
            "fail",
            Status::Succeeded,
        )));
        let (status, body) = body_json(err).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(
            body["error"]["message"],
            "conflict: invalid transition: cannot fail a path that is succeeded"
        );
        assert_eq!(
            body["error"]["details"],
            serde_json::json!({"update": "fail", "from": "succeeded"})
        );
    }

    #[tokio::test]
    async fn only_conflicts_carry_details() {
        for err in [
            AppError::NotFound("/x".into()),
            AppError::BadRequest("x".into()),
            AppError::RequestTimeout("x".into()),
            AppError::ServiceUnavailable("x".into()),
        ] {
            let (_, body) = body_json(err).await;
            assert!(body["error"].get("details").is_none(), "{body}");
        }
    }
}
