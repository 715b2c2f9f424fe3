// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Close and abort sequences
//!
//! A graceful close runs three steps in order: the stateless instance, the
//! replicator, then the stateful replica. Each step tolerates having nothing
//! to do, and a failed graceful close is absorbed by aborting that resource.
//! The whole sequence holds the proxy lock exclusively, so a second close
//! queues behind the first and then finds the proxy already closed.

use crate::error::ProxyError;
use crate::proxy::ReplicaProxy;
use crate::state::{ProxyState, ReplicaRole, ReplicatorState, ServiceState};
use rap_adapters::{Replicator, StatefulService, StatelessService};
use rap_core::Clock;
use std::sync::Arc;
use tokio::task::JoinHandle;

impl<S, L, R, C> ReplicaProxy<S, L, R, C>
where
    S: StatefulService,
    L: StatelessService,
    R: Replicator,
    C: Clock,
{
    /// Close the proxy and everything it hosts
    ///
    /// Succeeds once every resource has been closed or aborted. Once the proxy
    /// lock is held the sequence runs on its own task, so dropping the
    /// returned future does not leave the proxy half closed.
    pub async fn close(self: &Arc<Self>) -> Result<(), ProxyError> {
        let guard = self.lock.exclusive().await?;

        let proxy = Arc::clone(self);
        let sequence = tokio::spawn(async move {
            let _guard = guard;
            proxy.run_close().await;
        });
        match sequence.await {
            Ok(()) => Ok(()),
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(_) => Err(ProxyError::CloseInterrupted { proxy: self.id }),
        }
    }

    /// Close sequence; the caller holds the proxy lock exclusively
    async fn run_close(&self) {
        let roles_match = {
            let mut inner = self.inner();
            match inner.state {
                ProxyState::Closed => {
                    tracing::debug!(proxy = %self.id, "close requested on closed proxy");
                    return;
                }
                ProxyState::Opened => inner.transition(ProxyState::Closing, self.clock.now()),
                ProxyState::Closing => {}
            }
            inner.service_role == inner.replicator_role
        };

        tracing::info!(proxy = %self.id, "closing");
        if roles_match {
            self.close_instance().await;
            self.close_replicator().await;
            self.close_replica().await;
        } else {
            tracing::warn!(proxy = %self.id, "service and replicator roles disagree, aborting");
            self.abort_replicator();
            self.abort_replica();
            self.abort_instance();
        }

        let mut inner = self.inner();
        assert!(
            !inner.holds_references(),
            "proxy {} closed while still holding references",
            self.id
        );
        inner.service_role = ReplicaRole::Unknown;
        inner.replicator_role = ReplicaRole::Unknown;
        inner.transition(ProxyState::Closed, self.clock.now());
        tracing::info!(proxy = %self.id, "closed");
    }

    /// Abort everything the proxy hosts without attempting a graceful close
    ///
    /// With `keep_open` the proxy returns to the state it was in, ready to
    /// host new resources; otherwise it ends closed.
    pub async fn abort(&self, keep_open: bool) -> Result<(), ProxyError> {
        let _guard = self.lock.exclusive().await?;

        let initial = {
            let mut inner = self.inner();
            if inner.state == ProxyState::Closed {
                return Ok(());
            }
            let initial = inner.state;
            inner.transition(ProxyState::Closing, self.clock.now());
            initial
        };

        tracing::info!(proxy = %self.id, keep_open, "aborting");
        self.abort_replicator();
        self.abort_replica();
        self.abort_instance();

        let mut inner = self.inner();
        if keep_open {
            inner.marked_for_abort = false;
            inner.transition(initial, self.clock.now());
        } else {
            inner.service_role = ReplicaRole::Unknown;
            inner.replicator_role = ReplicaRole::Unknown;
            inner.transition(ProxyState::Closed, self.clock.now());
        }
        Ok(())
    }

    async fn close_instance(&self) {
        let Some(instance) = self.inner().stateless_instance() else {
            self.abort_instance();
            return;
        };

        match instance.close().await {
            Ok(()) => {
                drop(instance);
                let mut inner = self.inner();
                inner.service = None;
                inner.service_state = ServiceState::Closed;
                tracing::debug!(proxy = %self.id, "instance closed");
            }
            Err(e) => {
                tracing::warn!(proxy = %self.id, error = %e, "instance close failed, aborting");
                drop(instance);
                self.abort_instance();
            }
        }
    }

    async fn close_replicator(&self) {
        let replicator = {
            let inner = self.inner();
            match inner.replicator_state {
                ReplicatorState::Opened => inner.replicator.clone(),
                ReplicatorState::Closed => None,
            }
        };
        let Some(replicator) = replicator else {
            self.abort_replicator();
            return;
        };

        match replicator.close().await {
            Ok(()) => {
                drop(replicator);
                let mut inner = self.inner();
                inner.replicator = None;
                inner.replicator_state = ReplicatorState::Closed;
                tracing::debug!(proxy = %self.id, "replicator closed");
            }
            Err(e) => {
                tracing::warn!(proxy = %self.id, error = %e, "replicator close failed, aborting");
                drop(replicator);
                self.abort_replicator();
            }
        }
    }

    async fn close_replica(&self) {
        let Some(replica) = self.inner().stateful_service() else {
            self.abort_replica();
            return;
        };

        match replica.close().await {
            Ok(()) => {
                drop(replica);
                let mut inner = self.inner();
                inner.service = None;
                inner.service_state = ServiceState::Closed;
                tracing::debug!(proxy = %self.id, "replica closed");
            }
            Err(e) => {
                tracing::warn!(proxy = %self.id, error = %e, "replica close failed, aborting");
                drop(replica);
                self.abort_replica();
            }
        }
    }

    fn abort_instance(&self) {
        let instance = {
            let mut inner = self.inner();
            let instance = inner.stateless_instance();
            if instance.is_some() {
                inner.service = None;
            }
            instance
        };
        let Some(instance) = instance else {
            tracing::trace!(proxy = %self.id, "abort skipped, no instance");
            return;
        };

        instance.abort();
        self.inner().service_state = ServiceState::Closed;
        tracing::debug!(proxy = %self.id, "instance aborted");
    }

    fn abort_replica(&self) {
        let replica = {
            let mut inner = self.inner();
            let replica = inner.stateful_service();
            if replica.is_some() {
                inner.service = None;
            }
            replica
        };
        let Some(replica) = replica else {
            tracing::trace!(proxy = %self.id, "abort skipped, no replica");
            return;
        };

        replica.abort();
        self.inner().service_state = ServiceState::Closed;
        tracing::debug!(proxy = %self.id, "replica aborted");
    }

    fn abort_replicator(&self) {
        let replicator = {
            let mut inner = self.inner();
            let Some(replicator) = inner.replicator.take() else {
                tracing::trace!(proxy = %self.id, "abort skipped, no replicator");
                return;
            };
            if inner.replicator_state == ReplicatorState::Closed {
                // Held but never opened
                return;
            }
            replicator
        };

        replicator.abort();
        self.inner().replicator_state = ReplicatorState::Closed;
        tracing::debug!(proxy = %self.id, "replicator aborted");
    }
}

impl<S, L, R, C> ReplicaProxy<S, L, R, C>
where
    S: StatefulService,
    L: StatelessService,
    R: Replicator,
    C: Clock,
{
    /// Start a close in the background and report its outcome to `callback`
    ///
    /// The callback runs exactly once, on the runtime.
    pub fn begin_close<F>(self: &Arc<Self>, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(Result<(), ProxyError>) + Send + 'static,
    {
        let proxy = Arc::clone(self);
        tokio::spawn(async move {
            let result = proxy.close().await;
            callback(result);
        })
    }
}

#[cfg(test)]
#[path = "close_tests.rs"]
mod tests;
