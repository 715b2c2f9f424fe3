// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Service instances hosted behind a replica proxy

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeService, ServiceCall};

use async_trait::async_trait;
use thiserror::Error;

/// Errors from service operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("close failed: {0}")]
    CloseFailed(String),
    #[error("service already closed")]
    AlreadyClosed,
}

/// A stateful service replica
#[async_trait]
pub trait StatefulService: Send + Sync + 'static {
    /// Gracefully close the replica
    async fn close(&self) -> Result<(), ServiceError>;

    /// Tear the replica down immediately; never fails
    fn abort(&self);
}

/// A stateless service instance
#[async_trait]
pub trait StatelessService: Send + Sync + 'static {
    /// Gracefully close the instance
    async fn close(&self) -> Result<(), ServiceError>;

    /// Tear the instance down immediately; never fails
    fn abort(&self);
}
