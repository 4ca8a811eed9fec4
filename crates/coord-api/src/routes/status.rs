//! # Status Routes
//!
//! Every path below the mount prefix is a status key:
//!
//! | Method         | Effect                                                   |
//! |----------------|----------------------------------------------------------|
//! | `GET`          | current status; `?wait=<predicate>` blocks first         |
//! | `PUT` / `POST` | `{"status": "<name>"}` assigns, `{"action": "<update>"}` applies a transition |
//! | `DELETE`       | removes the path                                         |
//!
//! The key is the request path exactly as received, percent-encoding and
//! leading slash included, minus the mount prefix.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};
use axum::http::{StatusCode, Uri};
use axum::routing::{get, MethodRouter};
use axum::{Json, Router};
use coord_core::{Assign, Condition, Status, StatusUpdate, Transition, TransitionError};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extractors::{extract_json, extract_query};
use crate::state::AppState;

// ─── Wire Types ──────────────────────────────────────────────────────

/// Body of a successful read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: Status,
}

/// Query string of a read.
#[derive(Debug, Default, Deserialize)]
pub struct ReadQuery {
    /// Predicate to wait for before reading.
    pub wait: Option<String>,
}

/// Body of a write. Exactly one field must be set.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateRequest {
    pub status: Option<String>,
    pub action: Option<String>,
}

/// A decoded write request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RequestedUpdate {
    Assign(Assign),
    Transition(Transition),
}

impl TryFrom<UpdateRequest> for RequestedUpdate {
    type Error = AppError;

    fn try_from(request: UpdateRequest) -> Result<Self, Self::Error> {
        match (request.status, request.action) {
            (Some(status), None) => Ok(Self::Assign(Assign(status.parse()?))),
            (None, Some(action)) => Ok(Self::Transition(action.parse()?)),
            (Some(_), Some(_)) => Err(AppError::BadRequest(
                "body must set either \"status\" or \"action\", not both".into(),
            )),
            (None, None) => Err(AppError::BadRequest(
                "body must set \"status\" or \"action\"".into(),
            )),
        }
    }
}

impl StatusUpdate for RequestedUpdate {
    fn apply(&self, current: Status) -> Result<Status, TransitionError> {
        match self {
            Self::Assign(assign) => assign.apply(current),
            Self::Transition(transition) => transition.apply(current),
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Assign(assign) => assign.name(),
            Self::Transition(transition) => transition.name(),
        }
    }
}

// ─── Router ──────────────────────────────────────────────────────────

/// Build the status router. Paths are taken from the request URI, so the
/// router works both at the root and nested under a prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", handlers())
        .route("/{*path}", handlers())
}

fn handlers() -> MethodRouter<AppState> {
    get(read_status)
        .put(write_status)
        .post(write_status)
        .delete(remove_status)
}

// ─── Handlers ────────────────────────────────────────────────────────

/// GET: optionally wait for a predicate, then report the current status.
async fn read_status(
    State(state): State<AppState>,
    uri: Uri,
    query: Result<Query<ReadQuery>, QueryRejection>,
) -> Result<Json<StatusResponse>, AppError> {
    let path = uri.path();
    let query = extract_query(query)?;

    if let Some(wanted) = query.wait.as_deref().filter(|w| !w.is_empty()) {
        let condition: Condition = wanted.parse()?;
        let outcome = state
            .store
            .wait_timeout(path, &condition, state.config.wait_ceiling)
            .await;
        tracing::debug!(path, %condition, ?outcome, "wait ended");
        match outcome {
            coord_core::WaitOutcome::Fulfilled => {}
            coord_core::WaitOutcome::Shutdown => {
                return Err(AppError::ServiceUnavailable(
                    "status store is shut down".into(),
                ))
            }
            _ => {
                return Err(AppError::RequestTimeout(format!(
                    "{path} did not become {condition}"
                )))
            }
        }
    }

    match state.store.get(path) {
        Status::Undefined => Err(AppError::NotFound(path.to_string())),
        status => Ok(Json(StatusResponse { status })),
    }
}

/// PUT/POST: apply an assignment or a named transition.
async fn write_status(
    State(state): State<AppState>,
    uri: Uri,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<StatusCode, AppError> {
    let update = RequestedUpdate::try_from(extract_json(body)?)?;
    state.store.update(uri.path(), update).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// DELETE: forget the path. Removing an absent path is not an error.
async fn remove_status(State(state): State<AppState>, uri: Uri) -> Result<StatusCode, AppError> {
    state.store.remove(uri.path()).await?;
    Ok(StatusCode::NO_CONTENT)
}
