//! # Status Domain
//!
//! The fixed lifecycle of a unit of work and the named vocabulary over it.
//!
//! ## Transitions
//!
//! ```text
//! name     allowed from            result      otherwise
//! start    UNDEFINED, STARTED      STARTED     rejected
//! finish   STARTED                 SUCCEEDED   SUCCEEDED/FAILED unchanged, UNDEFINED rejected
//! fail     all but SUCCEEDED       FAILED      rejected
//! ```
//!
//! ## Predicates
//!
//! A predicate answers two questions about a status: is the condition met
//! now, and can it still be met later. A condition that is neither fulfilled
//! nor possible is a dead end, and waits on it return immediately.
//!
//! ## Extension
//!
//! The named vocabulary is closed: [`Transition`] and [`Condition`] are
//! enums looked up through `const` tables. Custom behaviour plugs in through
//! the [`StatusUpdate`] and [`StatusPredicate`] traits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{DecodeError, TransitionError};

// ─── Status ──────────────────────────────────────────────────────────

/// Lifecycle stage of a unit of work.
///
/// The derived ordering `Undefined < Started < Succeeded < Failed` exists for
/// predicate short-circuiting only and carries no notion of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Status {
    /// No status has been published (absent path).
    #[default]
    Undefined,
    /// Work has started.
    Started,
    /// Work completed successfully. Terminal.
    Succeeded,
    /// Work failed.
    Failed,
}

impl Status {
    /// Every status, in internal order.
    pub const ALL: [Status; 4] = [
        Status::Undefined,
        Status::Started,
        Status::Succeeded,
        Status::Failed,
    ];

    /// Canonical lower-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    /// Whether the work has reached an end state.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive; surrounding whitespace is ignored.
impl FromStr for Status {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DecodeError::UnknownStatus(s.to_string()))
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

// ─── Updates ─────────────────────────────────────────────────────────

/// A function computing the next status of a path from its current one.
///
/// Implementations run on the store's single writer. A returned error leaves
/// the path untouched; so does a panic, which the store converts into
/// [`StoreError::Fault`](crate::StoreError::Fault).
pub trait StatusUpdate: Send + 'static {
    /// Compute the next status, or reject the move.
    fn apply(&self, current: Status) -> Result<Status, TransitionError>;

    /// Name used in logs and rejection messages.
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> StatusUpdate for F
where
    F: Fn(Status) -> Result<Status, TransitionError> + Send + 'static,
{
    fn apply(&self, current: Status) -> Result<Status, TransitionError> {
        self(current)
    }
}

/// The predefined, named transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transition {
    /// Mark work as started. Idempotent while started.
    Start,
    /// Mark started work as succeeded. No-op once finished.
    Finish,
    /// Mark work as failed, unless it already succeeded.
    Fail,
}

impl Transition {
    /// Lookup table of every named transition.
    pub const ALL: [Transition; 3] = [Transition::Start, Transition::Finish, Transition::Fail];

    /// Name used on the wire (`{"action": "<name>"}`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Finish => "finish",
            Self::Fail => "fail",
        }
    }
}

impl StatusUpdate for Transition {
    fn apply(&self, current: Status) -> Result<Status, TransitionError> {
        use Status::*;

        match (self, current) {
            (Self::Start, Undefined | Started) => Ok(Started),
            (Self::Finish, Started) => Ok(Succeeded),
            (Self::Finish, Succeeded | Failed) => Ok(current),
            (Self::Fail, Undefined | Started | Failed) => Ok(Failed),
            _ => Err(TransitionError::new(self.as_str(), current)),
        }
    }

    fn name(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Transition {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownUpdate(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Transition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Transition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Unconditional assignment, used for `{"status": "<name>"}` request bodies.
///
/// Assigning [`Status::Undefined`] is equivalent to removing the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assign(pub Status);

impl StatusUpdate for Assign {
    fn apply(&self, _current: Status) -> Result<Status, TransitionError> {
        Ok(self.0)
    }

    fn name(&self) -> &str {
        "set"
    }
}

// ─── Predicates ──────────────────────────────────────────────────────

/// A condition over a status that a waiter blocks on.
pub trait StatusPredicate {
    /// The condition holds for `status`.
    fn is_fulfilled(&self, status: Status) -> bool;

    /// The condition may still come to hold starting from `status`.
    ///
    /// Only meaningful while [`is_fulfilled`](Self::is_fulfilled) is false.
    fn is_possible(&self, status: Status) -> bool;
}

/// The predefined, named predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    /// Status is `started`.
    Started,
    /// Status is `succeeded`.
    Succeeded,
    /// Status is `failed`.
    Failed,
    /// Status is `started`; gives up once the work finished.
    Running,
    /// Status is `succeeded` or `failed`.
    Finished,
}

impl Condition {
    /// Lookup table of every named predicate.
    pub const ALL: [Condition; 5] = [
        Condition::Started,
        Condition::Succeeded,
        Condition::Failed,
        Condition::Running,
        Condition::Finished,
    ];

    /// Name used on the wire (`?wait=<name>`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }
}

impl StatusPredicate for Condition {
    fn is_fulfilled(&self, status: Status) -> bool {
        match self {
            Self::Started | Self::Running => status == Status::Started,
            Self::Succeeded => status == Status::Succeeded,
            Self::Failed => status == Status::Failed,
            Self::Finished => status.is_finished(),
        }
    }

    fn is_possible(&self, status: Status) -> bool {
        match self {
            Self::Started | Self::Running | Self::Failed => status <= Status::Started,
            Self::Succeeded => status <= Status::Succeeded,
            Self::Finished => true,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Condition {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownPredicate(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for Condition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Condition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
