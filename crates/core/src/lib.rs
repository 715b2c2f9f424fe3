// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rap-core: concurrency core of the replica proxy
//!
//! This crate provides:
//! - An exclusive/shared resource lock with FIFO fairness and cancellable async acquisition
//! - The action-list compatibility table that gates concurrent proxy operations
//! - Proxy configuration, identifiers and a testable clock

pub mod clock;
pub mod id;

pub mod actions;
pub mod config;
pub mod coordination;

// Re-exports
pub use actions::{ActionKind, CompatibilityMatrix};
pub use clock::{Clock, FakeClock, SystemClock};
pub use config::{ConfigError, ProxyConfig};
pub use coordination::{
    Acquire, AcquireError, AcquireMode, AcquireRequest, ExclusiveGuard, LockSnapshot,
    RequestId, RequestState, ResourceLock, ResourceLockConfig, SharedGuard,
};
pub use id::{FailoverUnitId, ProxyId};
