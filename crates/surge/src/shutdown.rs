//! Pool lifecycle coordination.
//!
//! The coordinator owns two things: the termination flag every concurrent
//! participant watches, and the pool's lifecycle state machine
//! (`Created → Running → Draining → Stopped`).
//!
//! `finish()` flips the flag at most once, no matter how often it is
//! called. The flag alone does not mean the pool is done: between the flag
//! being set and the last worker exiting, the pool is *draining* - queued
//! jobs are still being processed. The pool reports [`PoolState::Stopped`]
//! only after every tracked worker and the scaler loop have exited.

use std::sync::atomic::{AtomicU8, Ordering};
use tokio_util::sync::CancellationToken;

const CREATED: u8 = 0;
const RUNNING: u8 = 1;
const DRAINING: u8 = 2;
const STOPPED: u8 = 3;

/// Externally observable lifecycle of an elastic pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PoolState {
    /// Constructed, no workers launched yet.
    Created,
    /// Workers processing, scaler active.
    Running,
    /// Queue closed; no new jobs; existing workers finishing the backlog.
    Draining,
    /// All workers exited and the scaler loop stopped.
    Stopped,
}

/// Owns the termination flag and the pool state machine.
///
/// The flag is written by exactly one logical event (`finish`) and read by
/// every worker spawn path and the scaler loop.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    token: CancellationToken,
    state: AtomicU8,
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            state: AtomicU8::new(CREATED),
        }
    }

    /// Marks the pool as running. Called once by the pool right after the
    /// initial workers and the scaler have been launched.
    pub(crate) fn mark_running(&self) {
        let _ = self
            .state
            .compare_exchange(CREATED, RUNNING, Ordering::AcqRel, Ordering::Acquire);
    }

    /// Enters the draining phase and sets the termination flag.
    ///
    /// Idempotent: the flag transitions false → true at most once. Returns
    /// `true` on the call that performed the transition.
    pub fn finish(&self) -> bool {
        let prev = self.state.fetch_max(DRAINING, Ordering::AcqRel);
        if prev < DRAINING {
            self.token.cancel();
            true
        } else {
            false
        }
    }

    /// Marks the drain as complete. Called by the pool once the last worker
    /// and the scaler loop have both exited.
    pub(crate) fn mark_stopped(&self) {
        self.state.fetch_max(STOPPED, Ordering::AcqRel);
    }

    /// Whether the termination flag has been set.
    pub fn is_terminated(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the termination flag is set. Used by the scaler loop
    /// to exit promptly instead of sleeping through a full tick.
    pub async fn terminated(&self) {
        self.token.cancelled().await;
    }

    /// Current lifecycle state.
    pub fn state(&self) -> PoolState {
        match self.state.load(Ordering::Acquire) {
            CREATED => PoolState::Created,
            RUNNING => PoolState::Running,
            DRAINING => PoolState::Draining,
            _ => PoolState::Stopped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_lifecycle_in_order() {
        let coordinator = ShutdownCoordinator::new();
        assert_eq!(coordinator.state(), PoolState::Created);
        assert!(!coordinator.is_terminated());

        coordinator.mark_running();
        assert_eq!(coordinator.state(), PoolState::Running);

        assert!(coordinator.finish());
        assert_eq!(coordinator.state(), PoolState::Draining);
        assert!(coordinator.is_terminated());

        coordinator.mark_stopped();
        assert_eq!(coordinator.state(), PoolState::Stopped);
    }

    #[test]
    fn finish_is_idempotent() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.mark_running();
        assert!(coordinator.finish());
        assert!(!coordinator.finish());
        assert!(!coordinator.finish());
        assert_eq!(coordinator.state(), PoolState::Draining);
    }

    #[test]
    fn stopped_is_terminal() {
        let coordinator = ShutdownCoordinator::new();
        coordinator.mark_running();
        coordinator.finish();
        coordinator.mark_stopped();
        // A late finish() must not regress the state.
        assert!(!coordinator.finish());
        assert_eq!(coordinator.state(), PoolState::Stopped);
    }

    #[tokio::test]
    async fn terminated_future_resolves_after_finish() {
        let coordinator = std::sync::Arc::new(ShutdownCoordinator::new());
        coordinator.mark_running();

        let watcher = std::sync::Arc::clone(&coordinator);
        let waiting = tokio::spawn(async move { watcher.terminated().await });

        coordinator.finish();
        waiting.await.unwrap();
    }
}
