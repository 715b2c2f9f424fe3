// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Replicators paired with stateful replicas

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeReplicator, ReplicatorCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from replicator operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplicatorError {
    #[error("replicator close failed: {0}")]
    CloseFailed(String),
    #[error("replicator not open")]
    NotOpen,
}

/// Replicates state between the replicas of a failover unit
#[async_trait]
pub trait Replicator: Send + Sync + 'static {
    /// Gracefully close the replicator
    async fn close(&self) -> Result<(), ReplicatorError>;

    /// Tear the replicator down immediately; never fails
    fn abort(&self);
}
