// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced collaborator wrappers for consistent observability

use crate::replicator::{Replicator, ReplicatorError};
use crate::service::{ServiceError, StatefulService, StatelessService};
use async_trait::async_trait;
use tracing::Instrument;

/// Wrapper that adds tracing to any StatefulService
#[derive(Clone)]
pub struct TracedStatefulService<S> {
    inner: S,
}

impl<S> TracedStatefulService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: StatefulService> StatefulService for TracedStatefulService<S> {
    async fn close(&self) -> Result<(), ServiceError> {
        let span = tracing::info_span!("service.close", kind = "stateful");
        async {
            tracing::info!("closing replica");

            let start = std::time::Instant::now();
            let result = self.inner.close().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "replica closed"),
                // Close failures fall back to abort, so they are not errors here
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "replica close failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    fn abort(&self) {
        let span = tracing::info_span!("service.abort", kind = "stateful");
        let _guard = span.enter();

        self.inner.abort();
        tracing::info!("replica aborted");
    }
}

/// Wrapper that adds tracing to any StatelessService
#[derive(Clone)]
pub struct TracedStatelessService<S> {
    inner: S,
}

impl<S> TracedStatelessService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: StatelessService> StatelessService for TracedStatelessService<S> {
    async fn close(&self) -> Result<(), ServiceError> {
        let span = tracing::info_span!("service.close", kind = "stateless");
        async {
            tracing::info!("closing instance");

            let start = std::time::Instant::now();
            let result = self.inner.close().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "instance closed"),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "instance close failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    fn abort(&self) {
        let span = tracing::info_span!("service.abort", kind = "stateless");
        let _guard = span.enter();

        self.inner.abort();
        tracing::info!("instance aborted");
    }
}

/// Wrapper that adds tracing to any Replicator
#[derive(Clone)]
pub struct TracedReplicator<R> {
    inner: R,
}

impl<R> TracedReplicator<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }
}

#[async_trait]
impl<R: Replicator> Replicator for TracedReplicator<R> {
    async fn close(&self) -> Result<(), ReplicatorError> {
        let span = tracing::info_span!("replicator.close");
        async {
            tracing::info!("closing replicator");

            let start = std::time::Instant::now();
            let result = self.inner.close().await;
            let elapsed = start.elapsed();

            match &result {
                Ok(()) => tracing::info!(elapsed_ms = elapsed.as_millis() as u64, "replicator closed"),
                Err(e) => tracing::warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    error = %e,
                    "replicator close failed"
                ),
            }

            result
        }
        .instrument(span)
        .await
    }

    fn abort(&self) {
        let span = tracing::info_span!("replicator.abort");
        let _guard = span.enter();

        self.inner.abort();
        tracing::info!("replicator aborted");
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
