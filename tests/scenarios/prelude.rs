// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for scenario tests

use rap_core::{Acquire, AcquireMode, AcquireRequest, LockSnapshot, ResourceLock, ResourceLockConfig};
use std::sync::Arc;

pub fn lock(name: &str) -> Arc<ResourceLock> {
    Arc::new(ResourceLock::new(ResourceLockConfig::new(name)))
}

/// Start an acquisition, keeping the request alive beside its future
pub fn start(lock: &Arc<ResourceLock>, mode: AcquireMode) -> (AcquireRequest, Acquire) {
    let request = AcquireRequest::new(Arc::clone(lock), mode);
    let acquire = request.acquire();
    (request, acquire)
}

/// Take a completed grant; false when still pending or failed
pub fn granted(acquire: &mut Acquire) -> bool {
    matches!(acquire.try_take(), Some(Ok(())))
}

pub fn expected(
    shared_ref_count: i64,
    exclusive_acquire_in_progress: bool,
    has_exclusive_waiter: bool,
    queued_waiters: usize,
) -> LockSnapshot {
    LockSnapshot {
        shared_ref_count,
        exclusive_acquire_in_progress,
        has_exclusive_waiter,
        queued_waiters,
    }
}
