// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Acquisition requests against a [`ResourceLock`]
//!
//! An [`AcquireRequest`] is a reusable handle for one acquisition at a time.
//! [`AcquireRequest::acquire`] starts the acquisition and returns an
//! [`Acquire`] future that is already complete when the lock was granted
//! inline, and resolves later when the request had to queue.

use super::resource_lock::{CancelOutcome, ResourceLock};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::oneshot;

/// Identifier of a request, unique per lock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// Lock mode a request acquires
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AcquireMode {
    Shared,
    Exclusive,
}

/// Expected, non-fatal acquisition outcomes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum AcquireError {
    #[error("acquisition cancelled")]
    Cancelled,
    #[error("acquisition abandoned by the lock")]
    Abandoned,
}

/// Completion state of a request
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestState {
    /// Never started, or reset for reuse
    NotStarted,
    /// Queued or running down shared holders
    Pending,
    /// Granted
    Completed,
    /// Cancelled before it was granted
    Cancelled,
}

impl RequestState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestState::Completed | RequestState::Cancelled)
    }
}

/// Delivery side of a pending acquisition, owned by the lock while queued
pub(crate) struct Completion {
    state: Arc<Mutex<RequestState>>,
    tx: oneshot::Sender<Result<(), AcquireError>>,
}

impl Completion {
    pub(crate) fn complete(self, result: Result<(), AcquireError>) {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            *state = match result {
                Ok(()) => RequestState::Completed,
                Err(_) => RequestState::Cancelled,
            };
        }
        // Receiver gone means the Acquire future was dropped after it
        // cancelled; nothing is owed to anyone.
        let _ = self.tx.send(result);
    }
}

/// A reusable, cancellable acquisition handle
pub struct AcquireRequest {
    lock: Arc<ResourceLock>,
    mode: AcquireMode,
    id: Mutex<Option<RequestId>>,
    state: Arc<Mutex<RequestState>>,
}

impl AcquireRequest {
    pub fn new(lock: Arc<ResourceLock>, mode: AcquireMode) -> Self {
        Self {
            lock,
            mode,
            id: Mutex::new(None),
            state: Arc::new(Mutex::new(RequestState::NotStarted)),
        }
    }

    pub fn shared(lock: Arc<ResourceLock>) -> Self {
        Self::new(lock, AcquireMode::Shared)
    }

    pub fn exclusive(lock: Arc<ResourceLock>) -> Self {
        Self::new(lock, AcquireMode::Exclusive)
    }

    pub fn mode(&self) -> AcquireMode {
        self.mode
    }

    pub fn is_exclusive(&self) -> bool {
        self.mode == AcquireMode::Exclusive
    }

    pub fn state(&self) -> RequestState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Identifier of the current (or last) acquisition
    pub fn id(&self) -> Option<RequestId> {
        *self.id.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start an acquisition
    ///
    /// At most one acquisition may be outstanding per request; starting a
    /// second one while the first is pending is a caller bug.
    pub fn acquire(&self) -> Acquire {
        {
            let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
            assert!(
                *state != RequestState::Pending,
                "request against lock {} reused while an acquisition is pending",
                self.lock.name()
            );
            *state = RequestState::Pending;
        }

        let id = self.lock.next_request_id();
        *self.id.lock().unwrap_or_else(|e| e.into_inner()) = Some(id);

        let (tx, rx) = oneshot::channel();
        let completion = Completion {
            state: Arc::clone(&self.state),
            tx,
        };
        match self.mode {
            AcquireMode::Shared => self.lock.begin_shared(id, completion),
            AcquireMode::Exclusive => self.lock.begin_exclusive(id, completion),
        }

        Acquire {
            lock: Arc::clone(&self.lock),
            id,
            mode: self.mode,
            rx,
            ready: None,
            finished: false,
        }
    }

    /// Cancel the outstanding acquisition
    ///
    /// Idempotent: returns false when nothing was waiting (already granted,
    /// already cancelled, or never started).
    pub fn cancel(&self) -> bool {
        if self.state() != RequestState::Pending {
            tracing::debug!(lock = %self.lock.name(), state = ?self.state(), "cancel ignored, request not pending");
            return false;
        }
        match self.id() {
            Some(id) => self.lock.cancel(id) == CancelOutcome::Cancelled,
            None => false,
        }
    }

    /// Reset a finished request for reuse
    pub fn reset(&self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        assert!(
            *state != RequestState::Pending,
            "reset of a pending request against lock {}",
            self.lock.name()
        );
        *state = RequestState::NotStarted;
    }
}

impl std::fmt::Debug for AcquireRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AcquireRequest")
            .field("lock", &self.lock.name())
            .field("mode", &self.mode)
            .field("id", &self.id())
            .field("state", &self.state())
            .finish()
    }
}

/// Future of one acquisition
///
/// Resolving to `Ok(())` transfers ownership of the lock (in the request's
/// mode) to the caller, who must release it. Dropping an unresolved future
/// cancels the acquisition, and releases the lock if the grant raced ahead.
#[must_use = "an acquisition must be awaited or it is cancelled on drop"]
pub struct Acquire {
    lock: Arc<ResourceLock>,
    id: RequestId,
    mode: AcquireMode,
    rx: oneshot::Receiver<Result<(), AcquireError>>,
    /// Outcome taken from the channel but not yet returned from `poll`
    ready: Option<Result<(), AcquireError>>,
    finished: bool,
}

impl Acquire {
    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn mode(&self) -> AcquireMode {
        self.mode
    }

    /// True when the outcome is available without waiting
    ///
    /// Right after [`AcquireRequest::acquire`] this tells whether the
    /// acquisition completed synchronously.
    pub fn is_complete(&mut self) -> bool {
        if self.ready.is_some() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.ready = Some(result);
                true
            }
            Err(oneshot::error::TryRecvError::Empty) => false,
            Err(oneshot::error::TryRecvError::Closed) => {
                self.ready = Some(Err(AcquireError::Abandoned));
                true
            }
        }
    }

    /// Take the outcome if it is available, without waiting
    ///
    /// A returned `Ok(())` hands the lock to the caller exactly as awaiting
    /// the future would.
    pub fn try_take(&mut self) -> Option<Result<(), AcquireError>> {
        if !self.is_complete() {
            return None;
        }
        self.finished = true;
        self.ready.take()
    }

    fn release_grant(&self) {
        tracing::debug!(lock = %self.lock.name(), request = %self.id, "releasing grant of dropped acquisition");
        match self.mode {
            AcquireMode::Shared => self.lock.release_shared(),
            AcquireMode::Exclusive => self.lock.release_exclusive(),
        }
    }
}

impl Future for Acquire {
    type Output = Result<(), AcquireError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let result = match self.ready.take() {
            Some(result) => result,
            None => match Pin::new(&mut self.rx).poll(cx) {
                Poll::Ready(Ok(result)) => result,
                Poll::Ready(Err(_)) => Err(AcquireError::Abandoned),
                Poll::Pending => return Poll::Pending,
            },
        };
        self.finished = true;
        Poll::Ready(result)
    }
}

impl Drop for Acquire {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        if let Some(result) = self.ready.take() {
            if result.is_ok() {
                self.release_grant();
            }
            return;
        }
        if self.lock.cancel(self.id) == CancelOutcome::Cancelled {
            return;
        }
        // Completions are delivered under the lock's guard, so a grant that
        // beat the cancel is already in the channel.
        if let Ok(Ok(())) = self.rx.try_recv() {
            self.release_grant();
        }
    }
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
