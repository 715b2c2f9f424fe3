// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RAII ownership of a [`ResourceLock`]

use super::request::{AcquireError, AcquireRequest};
use super::resource_lock::ResourceLock;
use std::sync::Arc;

/// Shared ownership, released on drop
#[derive(Debug)]
#[must_use = "dropping the guard releases the lock immediately"]
pub struct SharedGuard {
    lock: Arc<ResourceLock>,
}

/// Exclusive ownership, released on drop
#[derive(Debug)]
#[must_use = "dropping the guard releases the lock immediately"]
pub struct ExclusiveGuard {
    lock: Arc<ResourceLock>,
}

impl SharedGuard {
    pub fn lock(&self) -> &ResourceLock {
        &self.lock
    }
}

impl ExclusiveGuard {
    pub fn lock(&self) -> &ResourceLock {
        &self.lock
    }
}

impl Drop for SharedGuard {
    fn drop(&mut self) {
        self.lock.release_shared();
    }
}

impl Drop for ExclusiveGuard {
    fn drop(&mut self) {
        self.lock.release_exclusive();
    }
}

impl ResourceLock {
    /// Acquire shared ownership, waiting behind exclusive acquisitions
    pub async fn shared(self: &Arc<Self>) -> Result<SharedGuard, AcquireError> {
        AcquireRequest::shared(Arc::clone(self)).acquire().await?;
        Ok(SharedGuard {
            lock: Arc::clone(self),
        })
    }

    /// Acquire exclusive ownership, waiting for queued requests and the rundown
    pub async fn exclusive(self: &Arc<Self>) -> Result<ExclusiveGuard, AcquireError> {
        AcquireRequest::exclusive(Arc::clone(self)).acquire().await?;
        Ok(ExclusiveGuard {
            lock: Arc::clone(self),
        })
    }

    /// Shared ownership through the lock-free fast path only
    pub fn try_shared(self: &Arc<Self>) -> Option<SharedGuard> {
        self.try_acquire_shared().then(|| SharedGuard {
            lock: Arc::clone(self),
        })
    }
}

#[cfg(test)]
#[path = "guard_tests.rs"]
mod tests;
