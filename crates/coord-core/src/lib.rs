//! # coord-core
//!
//! Status domain and in-memory status store for the coord coordination
//! service.
//!
//! Independent workers publish the lifecycle of units of work under
//! hierarchical path keys (`/build/frontend`, `/deploy/db/migrate`) and other
//! workers block until a path reaches a wanted condition.
//!
//! ## Modules
//!
//! - [`status`]: the four statuses, named transitions and wait predicates.
//! - [`tree`]: persistent prefix tree holding path → status snapshots.
//! - [`state`]: the single-writer store with change notification and waits.
//! - [`error`]: decode, transition and store errors.
//!
//! ## Usage
//!
//! ```no_run
//! use coord_core::{Condition, LocalState, Transition};
//!
//! # async fn demo() -> Result<(), coord_core::StoreError> {
//! let state = LocalState::new();
//! state.update("/build", Transition::Start).await?;
//! state.update("/build", Transition::Finish).await?;
//! let outcome = state
//!     .wait_timeout("/build", &Condition::Succeeded, std::time::Duration::from_secs(1))
//!     .await;
//! assert!(outcome.is_fulfilled());
//! state.stop().await;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod state;
pub mod status;
pub mod tree;

pub use error::{DecodeError, StoreError, TransitionError};
pub use state::{LocalState, WaitOutcome};
pub use status::{Assign, Condition, Status, StatusPredicate, StatusUpdate, Transition};
pub use tree::PathTree;
