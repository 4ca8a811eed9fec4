//! # Error Types
//!
//! Errors raised by the status store. All of them are plain values returned
//! to the caller of a command; nothing crosses the actor boundary as a panic.
//!
//! - [`DecodeError`]: unknown status, update or predicate name at a boundary.
//! - [`TransitionError`]: an update is illegal for the current status.
//! - [`StoreError`]: the result of a command submitted to the actor.

use thiserror::Error;

use crate::status::Status;

/// A name could not be decoded into a status-domain value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Text is not one of `undefined`, `started`, `succeeded`, `failed`.
    #[error("unknown status: '{0}'")]
    UnknownStatus(String),

    /// Text is not one of the predefined update names.
    #[error("unknown update: '{0}'")]
    UnknownUpdate(String),

    /// Text is not one of the predefined predicate names.
    #[error("unknown predicate: '{0}'")]
    UnknownPredicate(String),
}

/// An update was rejected because it is not legal from the current status.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid transition: cannot {update} a path that is {from}")]
pub struct TransitionError {
    /// Name of the rejected update.
    pub update: String,
    /// Status the path was in when the update was attempted.
    pub from: Status,
}

impl TransitionError {
    /// Build a rejection for `update` attempted from `from`.
    pub fn new(update: impl Into<String>, from: Status) -> Self {
        Self {
            update: update.into(),
            from,
        }
    }
}

/// Result of a command submitted to the status store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The update function refused the transition.
    #[error(transparent)]
    Transition(#[from] TransitionError),

    /// The update function panicked. The store was left unchanged.
    #[error("update fault: {0}")]
    Fault(String),

    /// The store has been stopped and no longer accepts commands.
    #[error("status store is shut down")]
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_error_names_update_and_status() {
        let err = TransitionError::new("fail", Status::Succeeded);
        assert_eq!(
            err.to_string(),
            "invalid transition: cannot fail a path that is succeeded"
        );
    }

    #[test]
    fn store_error_wraps_transition_transparently() {
        let err = StoreError::from(TransitionError::new("start", Status::Failed));
        assert!(matches!(err, StoreError::Transition(_)));
        assert!(err.to_string().starts_with("invalid transition"));
    }

    #[test]
    fn decode_error_quotes_input() {
        let err = DecodeError::UnknownPredicate("done".into());
        assert_eq!(err.to_string(), "unknown predicate: 'done'");
    }
}
