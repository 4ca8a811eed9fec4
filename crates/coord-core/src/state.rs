//! # Local Status Store
//!
//! The authoritative path → status mapping of a coord server.
//!
//! ## Architecture
//!
//! ```text
//!  callers ──Update/Remove/Stop──▶ mpsc ──▶ worker task ──store──▶ ArcSwap<PathTree>
//!     │                                          │                     ▲
//!     │◀───────────── oneshot reply ─────────────┘                     │
//!     │                                          └──send──▶ watch<u64> │
//!     └──────────────── get / wait (lock-free) ─────────────────────────┘
//! ```
//!
//! - One worker task owns every mutation. Commands are applied in arrival
//!   order and each caller is answered only once its command is applied, so
//!   a caller always reads its own writes.
//! - Published trees are immutable. [`LocalState::get`] loads the current
//!   version without synchronizing with the worker.
//! - Every observable change bumps a generation number on a `watch` channel.
//!   The worker publishes the tree before bumping the generation, and a
//!   waiter marks the generation seen before reading the tree, so a change
//!   can never slip between a waiter's check and its sleep.
//! - Update functions run behind `catch_unwind`: a panicking update becomes
//!   [`StoreError::Fault`] and the worker keeps serving.

use std::any::Any;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use tokio::sync::{mpsc, oneshot, watch};

use crate::error::StoreError;
use crate::status::{Status, StatusPredicate, StatusUpdate};
use crate::tree::PathTree;

/// Capacity of the command intake.
const COMMAND_BUFFER: usize = 64;

// ─── Wait Outcome ────────────────────────────────────────────────────

/// How a [`LocalState::wait`] call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
    /// The predicate holds for the current status.
    Fulfilled,
    /// The predicate can no longer hold from the current status.
    Impossible,
    /// The cancellation signal fired first.
    Cancelled,
    /// The store stopped while the predicate was still pending.
    Shutdown,
}

impl WaitOutcome {
    /// Whether the awaited condition was reached.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled)
    }
}

// ─── Commands ────────────────────────────────────────────────────────

enum Command {
    Update {
        path: Vec<u8>,
        update: Box<dyn StatusUpdate>,
        reply: oneshot::Sender<Result<(), StoreError>>,
    },
    Remove {
        path: Vec<u8>,
        reply: oneshot::Sender<bool>,
    },
    Stop,
}

// ─── Handle ──────────────────────────────────────────────────────────

/// Handle to a running status store.
///
/// Cheap to clone; every clone talks to the same worker. The worker exits
/// after [`stop`](Self::stop), or once every handle has been dropped.
#[derive(Debug, Clone)]
pub struct LocalState {
    commands: mpsc::Sender<Command>,
    current: Arc<ArcSwap<PathTree>>,
    generation: watch::Receiver<u64>,
}

impl LocalState {
    /// Start an empty store.
    ///
    /// Spawns the worker on the ambient Tokio runtime; panics outside one.
    pub fn new() -> Self {
        let (commands, intake) = mpsc::channel(COMMAND_BUFFER);
        let (notifier, generation) = watch::channel(0);
        let current = Arc::new(ArcSwap::from_pointee(PathTree::new()));

        let worker = Worker {
            intake,
            current: Arc::clone(&current),
            tree: PathTree::new(),
            notifier,
        };
        tokio::spawn(worker.run());

        Self {
            commands,
            current,
            generation,
        }
    }

    /// Current status of `path`; [`Status::Undefined`] when absent.
    ///
    /// Never blocks and never waits for the worker.
    pub fn get(&self, path: impl AsRef<[u8]>) -> Status {
        self.current.load().get(path.as_ref())
    }

    /// The currently published tree.
    pub fn snapshot(&self) -> Arc<PathTree> {
        self.current.load_full()
    }

    /// Number of observable changes applied so far.
    pub fn generation(&self) -> u64 {
        *self.generation.borrow()
    }

    /// Whether the worker still accepts commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// Apply `update` to the status of `path`.
    ///
    /// Returns once the update has been applied or rejected. A rejected,
    /// faulting or no-op update leaves the store and its generation as they
    /// were.
    pub async fn update<U>(&self, path: impl AsRef<[u8]>, update: U) -> Result<(), StoreError>
    where
        U: StatusUpdate,
    {
        let (reply, response) = oneshot::channel();
        let command = Command::Update {
            path: path.as_ref().to_vec(),
            update: Box::new(update),
            reply,
        };
        self.commands
            .send(command)
            .await
            .map_err(|_| StoreError::Shutdown)?;
        response.await.map_err(|_| StoreError::Shutdown)?
    }

    /// Delete `path`. Returns whether an entry existed.
    pub async fn remove(&self, path: impl AsRef<[u8]>) -> Result<bool, StoreError> {
        let (reply, response) = oneshot::channel();
        let command = Command::Remove {
            path: path.as_ref().to_vec(),
            reply,
        };
        self.commands
            .send(command)
            .await
            .map_err(|_| StoreError::Shutdown)?;
        response.await.map_err(|_| StoreError::Shutdown)
    }

    /// Stop the worker.
    ///
    /// Commands already queued are still applied; commands submitted
    /// afterwards fail with [`StoreError::Shutdown`]. Returns once the worker
    /// has exited. Calling it again is harmless.
    pub async fn stop(&self) {
        // A failed send means the intake is already closed.
        let _ = self.commands.send(Command::Stop).await;
        let mut generation = self.generation.clone();
        // The worker drops the notifier as its very last act.
        while generation.changed().await.is_ok() {}
    }

    /// Block until `predicate` holds for `path`.
    ///
    /// Returns early with [`WaitOutcome::Impossible`] as soon as the
    /// predicate can no longer hold, and with [`WaitOutcome::Cancelled`] when
    /// `cancel` completes first. Every wake-up re-reads the status; a wake-up
    /// on its own proves nothing.
    pub async fn wait<P, C>(&self, path: impl AsRef<[u8]>, predicate: &P, cancel: C) -> WaitOutcome
    where
        P: StatusPredicate + ?Sized,
        C: Future<Output = ()>,
    {
        let path = path.as_ref();
        let mut changes = self.generation.clone();
        tokio::pin!(cancel);

        loop {
            let seen = *changes.borrow_and_update();
            let status = self.get(path);
            if predicate.is_fulfilled(status) {
                return WaitOutcome::Fulfilled;
            }
            if !predicate.is_possible(status) {
                tracing::debug!(path = %String::from_utf8_lossy(path), %status, "wait can no longer succeed");
                return WaitOutcome::Impossible;
            }
            tracing::trace!(path = %String::from_utf8_lossy(path), %status, generation = seen, "waiting for change");

            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        return WaitOutcome::Shutdown;
                    }
                }
                () = &mut cancel => return WaitOutcome::Cancelled,
            }
        }
    }

    /// [`wait`](Self::wait) with a deadline instead of a cancellation signal.
    pub async fn wait_timeout<P>(
        &self,
        path: impl AsRef<[u8]>,
        predicate: &P,
        timeout: Duration,
    ) -> WaitOutcome
    where
        P: StatusPredicate + ?Sized,
    {
        self.wait(path, predicate, tokio::time::sleep(timeout)).await
    }
}

impl Default for LocalState {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Worker ──────────────────────────────────────────────────────────

/// The single writer. Owns the intake and the generation notifier.
struct Worker {
    intake: mpsc::Receiver<Command>,
    current: Arc<ArcSwap<PathTree>>,
    tree: PathTree,
    notifier: watch::Sender<u64>,
}

impl Worker {
    async fn run(mut self) {
        tracing::info!("status store started");

        while let Some(command) = self.intake.recv().await {
            match command {
                Command::Update {
                    path,
                    update,
                    reply,
                } => {
                    let result = self.apply(&path, update.as_ref());
                    let _ = reply.send(result);
                }
                Command::Remove { path, reply } => {
                    let existed = self.remove(&path);
                    let _ = reply.send(existed);
                }
                Command::Stop => {
                    if !self.intake.is_closed() {
                        tracing::info!("stop requested, draining queued commands");
                        self.intake.close();
                    }
                }
            }
        }

        tracing::info!(
            paths = self.tree.len(),
            generation = *self.notifier.borrow(),
            "status store stopped"
        );
    }

    fn apply(&mut self, path: &[u8], update: &dyn StatusUpdate) -> Result<(), StoreError> {
        let current = self.tree.get(path);
        let next = match guarded(update, current) {
            Ok(next) => next,
            Err(err) => {
                tracing::warn!(
                    path = %String::from_utf8_lossy(path),
                    update = update.name(),
                    %current,
                    error = %err,
                    "update rejected"
                );
                return Err(err);
            }
        };

        tracing::debug!(
            path = %String::from_utf8_lossy(path),
            update = update.name(),
            from = %current,
            to = %next,
            "update applied"
        );
        if next == current {
            return Ok(());
        }

        // Undefined is never stored: it is what an absent path reads as.
        let (tree, _, changed) = if next == Status::Undefined {
            self.tree.remove(path)
        } else {
            self.tree.insert(path, next)
        };
        if changed {
            self.publish(tree);
        }
        Ok(())
    }

    fn remove(&mut self, path: &[u8]) -> bool {
        let (tree, previous, changed) = self.tree.remove(path);
        tracing::debug!(path = %String::from_utf8_lossy(path), ?previous, "remove applied");
        if changed {
            self.publish(tree);
        }
        changed
    }

    /// Swap in `tree`, then wake every waiter of the previous generation.
    fn publish(&mut self, tree: PathTree) {
        self.current.store(Arc::new(tree.clone()));
        self.tree = tree;
        self.notifier.send_modify(|generation| *generation += 1);
    }
}

/// Run `update` behind a panic boundary.
fn guarded(update: &dyn StatusUpdate, current: Status) -> Result<Status, StoreError> {
    match panic::catch_unwind(AssertUnwindSafe(|| update.apply(current))) {
        Ok(result) => result.map_err(StoreError::from),
        Err(payload) => Err(StoreError::Fault(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "update panicked".to_string()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
