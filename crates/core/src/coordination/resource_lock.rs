// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exclusive/shared resource lock with queued, fair acquisition
//!
//! The lock keeps a biased shared reference count: a free lock holds one
//! implicit reference of its own. Shared holders add to the count without
//! taking the guard mutex. An exclusive acquisition claims the lock and then
//! drops the bias reference, so the count reaches zero exactly when the last
//! pre-existing shared holder releases (the rundown). Everything queued
//! behind an exclusive acquisition waits in a FIFO owned by the lock.

use super::request::{AcquireError, AcquireMode, Completion, RequestId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Lock configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResourceLockConfig {
    /// Name identifying this lock in traces
    pub name: String,
}

impl ResourceLockConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Point-in-time view of the lock's bookkeeping
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LockSnapshot {
    pub shared_ref_count: i64,
    pub exclusive_acquire_in_progress: bool,
    pub has_exclusive_waiter: bool,
    pub queued_waiters: usize,
}

impl LockSnapshot {
    /// A lock nobody holds or waits on
    pub fn is_quiesced(&self) -> bool {
        self.shared_ref_count == 1
            && !self.exclusive_acquire_in_progress
            && !self.has_exclusive_waiter
            && self.queued_waiters == 0
    }
}

/// Outcome of cancelling a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The request was waiting and has been completed as cancelled
    Cancelled,
    /// The request was not waiting (already granted, cancelled, or never queued)
    NotPending,
}

pub(crate) struct Waiter {
    pub(crate) id: RequestId,
    pub(crate) mode: AcquireMode,
    pub(crate) completion: Completion,
}

/// State protected by the guard mutex
#[derive(Default)]
struct WaitState {
    /// Exclusive acquisition that owns the lock and waits for the rundown
    exclusive_waiter: Option<Waiter>,
    /// Requests queued behind an exclusive acquisition
    waiters: VecDeque<Waiter>,
}

/// Exclusive/shared lock with asynchronous FIFO acquisition
pub struct ResourceLock {
    config: ResourceLockConfig,
    shared_ref_count: AtomicI64,
    /// Written only while `wait_state` is held; read lock-free by the fast path.
    exclusive_acquire_in_progress: AtomicBool,
    wait_state: Mutex<WaitState>,
    next_request_id: AtomicU64,
}

impl ResourceLock {
    pub fn new(config: ResourceLockConfig) -> Self {
        Self {
            config,
            shared_ref_count: AtomicI64::new(1),
            exclusive_acquire_in_progress: AtomicBool::new(false),
            wait_state: Mutex::new(WaitState::default()),
            next_request_id: AtomicU64::new(1),
        }
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Snapshot of the current bookkeeping
    pub fn snapshot(&self) -> LockSnapshot {
        let state = self.wait_state();
        LockSnapshot {
            shared_ref_count: self.shared_ref_count.load(Ordering::SeqCst),
            exclusive_acquire_in_progress: self.exclusive_acquire_in_progress.load(Ordering::SeqCst),
            has_exclusive_waiter: state.exclusive_waiter.is_some(),
            queued_waiters: state.waiters.len(),
        }
    }

    /// Lock-free shared acquisition
    ///
    /// Returns false when an exclusive acquisition is in progress. The caller
    /// must call [`ResourceLock::release_shared`] after a successful return.
    pub fn try_acquire_shared(&self) -> bool {
        self.shared_ref_count.fetch_add(1, Ordering::SeqCst);
        if self.exclusive_acquire_in_progress.load(Ordering::SeqCst) {
            // Back out through the full release: our reference may be the one
            // holding a rundown above zero.
            self.release_shared();
            return false;
        }
        true
    }

    /// Release one shared reference
    pub fn release_shared(&self) {
        let remaining = self.shared_ref_count.fetch_sub(1, Ordering::SeqCst) - 1;
        assert!(
            remaining >= 0,
            "shared reference count underflow on lock {}",
            self.config.name
        );
        if remaining != 0 {
            return;
        }

        let mut state = self.wait_state();
        // A fast-path back-out can reach zero after the exclusive holder has
        // already handed off; only a count still at zero ends a rundown.
        if self.shared_ref_count.load(Ordering::SeqCst) != 0 {
            return;
        }
        // Under the guard a zero count implies an exclusive claim
        assert!(
            self.exclusive_acquire_in_progress.load(Ordering::SeqCst),
            "lock {} released below its bias with no exclusive acquisition in progress",
            self.config.name
        );
        if let Some(waiter) = state.exclusive_waiter.take() {
            tracing::debug!(lock = %self.config.name, request = %waiter.id, "rundown complete, exclusive granted");
            waiter.completion.complete(Ok(()));
        }
    }

    /// Release exclusive ownership and hand the lock to the queue head
    pub fn release_exclusive(&self) {
        let mut state = self.wait_state();
        assert!(
            self.exclusive_acquire_in_progress.load(Ordering::SeqCst),
            "release_exclusive on lock {} which is not exclusively held",
            self.config.name
        );
        assert!(
            state.exclusive_waiter.is_none(),
            "release_exclusive on lock {} while an exclusive acquisition is still running down",
            self.config.name
        );

        let start_rundown = self.hand_off(&mut state);
        drop(state);

        if start_rundown {
            self.release_shared();
        }
    }

    /// Allocate an identifier for a new request against this lock
    pub(crate) fn next_request_id(&self) -> RequestId {
        RequestId(self.next_request_id.fetch_add(1, Ordering::SeqCst))
    }

    pub(crate) fn begin_shared(&self, id: RequestId, completion: Completion) {
        if self.try_acquire_shared() {
            tracing::trace!(lock = %self.config.name, request = %id, "shared granted (fast path)");
            completion.complete(Ok(()));
            return;
        }

        let mut state = self.wait_state();
        if !self.exclusive_acquire_in_progress.load(Ordering::SeqCst) {
            self.shared_ref_count.fetch_add(1, Ordering::SeqCst);
            tracing::trace!(lock = %self.config.name, request = %id, "shared granted");
            completion.complete(Ok(()));
            return;
        }

        tracing::debug!(
            lock = %self.config.name,
            request = %id,
            queued = state.waiters.len() + 1,
            "shared queued behind exclusive"
        );
        state.waiters.push_back(Waiter {
            id,
            mode: AcquireMode::Shared,
            completion,
        });
    }

    pub(crate) fn begin_exclusive(&self, id: RequestId, completion: Completion) {
        let mut state = self.wait_state();
        if self.exclusive_acquire_in_progress.load(Ordering::SeqCst) {
            tracing::debug!(
                lock = %self.config.name,
                request = %id,
                queued = state.waiters.len() + 1,
                "exclusive queued"
            );
            state.waiters.push_back(Waiter {
                id,
                mode: AcquireMode::Exclusive,
                completion,
            });
            return;
        }

        assert!(
            state.exclusive_waiter.is_none(),
            "exclusive waiter already set on free lock {}",
            self.config.name
        );
        self.exclusive_acquire_in_progress.store(true, Ordering::SeqCst);
        state.exclusive_waiter = Some(Waiter {
            id,
            mode: AcquireMode::Exclusive,
            completion,
        });
        drop(state);

        tracing::debug!(lock = %self.config.name, request = %id, "exclusive claimed, running down shared holders");
        // Dropping the bias starts the rundown; completes inline if no shared holders remain.
        self.release_shared();
    }

    /// Cancel a waiting request
    pub(crate) fn cancel(&self, id: RequestId) -> CancelOutcome {
        let mut state = self.wait_state();

        if let Some(position) = state.waiters.iter().position(|w| w.id == id) {
            if let Some(waiter) = state.waiters.remove(position) {
                tracing::debug!(lock = %self.config.name, request = %id, mode = ?waiter.mode, "queued request cancelled");
                waiter.completion.complete(Err(AcquireError::Cancelled));
            }
            return CancelOutcome::Cancelled;
        }

        if state.exclusive_waiter.as_ref().is_some_and(|w| w.id == id) {
            if let Some(waiter) = state.exclusive_waiter.take() {
                tracing::debug!(lock = %self.config.name, request = %id, "exclusive cancelled during rundown");
                waiter.completion.complete(Err(AcquireError::Cancelled));
            }
            drop(state);
            // Treat the never-granted exclusive as granted and released so the
            // queue behind it moves on.
            self.release_exclusive();
            return CancelOutcome::Cancelled;
        }

        tracing::debug!(lock = %self.config.name, request = %id, "cancel ignored, request already completed");
        CancelOutcome::NotPending
    }

    /// Grant the queue head after an exclusive release
    ///
    /// Returns true when a new exclusive waiter was installed behind a shared
    /// batch and the caller must drop the bias to start its rundown.
    fn hand_off(&self, state: &mut WaitState) -> bool {
        let Some(head) = state.waiters.pop_front() else {
            self.shared_ref_count.fetch_add(1, Ordering::SeqCst);
            self.exclusive_acquire_in_progress.store(false, Ordering::SeqCst);
            tracing::trace!(lock = %self.config.name, "exclusive released, lock free");
            return false;
        };

        if head.mode == AcquireMode::Exclusive {
            // Shared holders remain here after a cancelled rundown or while a
            // fast-path reader is backing out.
            if self.shared_ref_count.load(Ordering::SeqCst) == 0 {
                tracing::debug!(lock = %self.config.name, request = %head.id, "exclusive handed off");
                head.completion.complete(Ok(()));
            } else {
                state.exclusive_waiter = Some(head);
            }
            return false;
        }

        // Bias for the shared batch
        self.shared_ref_count.fetch_add(1, Ordering::SeqCst);
        let mut granted = 0usize;
        let mut next = Some(head);
        while let Some(waiter) = next.take() {
            if waiter.mode == AcquireMode::Exclusive {
                tracing::debug!(
                    lock = %self.config.name,
                    granted,
                    request = %waiter.id,
                    "shared batch granted, exclusive waiting for rundown"
                );
                state.exclusive_waiter = Some(waiter);
                return true;
            }
            self.shared_ref_count.fetch_add(1, Ordering::SeqCst);
            waiter.completion.complete(Ok(()));
            granted += 1;
            next = state.waiters.pop_front();
        }

        self.exclusive_acquire_in_progress.store(false, Ordering::SeqCst);
        tracing::debug!(lock = %self.config.name, granted, "shared batch granted, lock shared");
        false
    }

    fn wait_state(&self) -> MutexGuard<'_, WaitState> {
        self.wait_state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for ResourceLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLock")
            .field("name", &self.config.name)
            .field("snapshot", &self.snapshot())
            .finish()
    }
}

impl Drop for ResourceLock {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }
        let snapshot = self.snapshot();
        assert!(
            snapshot.is_quiesced(),
            "lock {} dropped while in use: {:?}",
            self.config.name,
            snapshot
        );
    }
}

#[cfg(test)]
#[path = "resource_lock_tests.rs"]
mod tests;
