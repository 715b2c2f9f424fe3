// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process coordination primitives
//!
//! This module provides:
//! - **ResourceLock** - Exclusive/shared lock with FIFO queueing and lock-free shared fast path
//! - **AcquireRequest** - Reusable, cancellable acquisition handle
//! - **SharedGuard / ExclusiveGuard** - RAII ownership that releases on drop

pub mod guard;
pub mod request;
pub mod resource_lock;

pub use guard::{ExclusiveGuard, SharedGuard};
pub use request::{Acquire, AcquireError, AcquireMode, AcquireRequest, RequestId, RequestState};
pub use resource_lock::{CancelOutcome, LockSnapshot, ResourceLock, ResourceLockConfig};
