// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The replica proxy: the resources of one replica and their lifecycle
//!
//! All mutable state sits behind a short-lived mutex that is never held
//! across an await. Lifecycle operations (open, close, abort) additionally
//! hold the proxy's [`ResourceLock`] exclusively for their whole duration,
//! while [`ReplicaProxy::query`] takes it shared, so readers never observe a
//! half-finished transition.

use crate::admission::ActionListInfo;
use crate::error::ProxyError;
use crate::resources::{ServiceHandle, ServiceKind};
use crate::state::{ProxyState, ReadWriteStatus, ReplicaRole, ReplicatorState, ServiceState};
use rap_adapters::{Replicator, StatefulService, StatelessService};
use rap_core::{
    ActionKind, Clock, CompatibilityMatrix, ProxyConfig, ProxyId, ResourceLock,
    ResourceLockConfig, SystemClock,
};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::oneshot;

/// Point-in-time view of a proxy
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxySnapshot {
    pub id: ProxyId,
    pub state: ProxyState,
    pub service_state: ServiceState,
    pub replicator_state: ReplicatorState,
    pub service_role: ReplicaRole,
    pub replicator_role: ReplicaRole,
    pub read_write: ReadWriteStatus,
    pub service_kind: Option<ServiceKind>,
    pub has_replicator: bool,
    pub executing: Vec<ActionKind>,
    pub open_for_business: bool,
    pub marked_for_close: bool,
    pub marked_for_abort: bool,
}

pub(crate) struct ProxyInner<S, L, R> {
    pub(crate) state: ProxyState,
    pub(crate) last_transition: Instant,
    pub(crate) service: Option<Arc<ServiceHandle<S, L>>>,
    pub(crate) service_state: ServiceState,
    pub(crate) replicator: Option<Arc<R>>,
    pub(crate) replicator_state: ReplicatorState,
    pub(crate) service_role: ReplicaRole,
    pub(crate) replicator_role: ReplicaRole,
    pub(crate) read_write: ReadWriteStatus,
    pub(crate) executing: Vec<ActionListInfo>,
    pub(crate) open_for_business: bool,
    pub(crate) marked_for_close: bool,
    pub(crate) marked_for_abort: bool,
    pub(crate) drain: Option<oneshot::Sender<Result<(), ProxyError>>>,
}

impl<S, L, R> ProxyInner<S, L, R> {
    fn new(now: Instant) -> Self {
        Self {
            state: ProxyState::Closed,
            last_transition: now,
            service: None,
            service_state: ServiceState::Closed,
            replicator: None,
            replicator_state: ReplicatorState::Closed,
            service_role: ReplicaRole::Unknown,
            replicator_role: ReplicaRole::Unknown,
            read_write: ReadWriteStatus::not_primary(),
            executing: Vec::new(),
            open_for_business: true,
            marked_for_close: false,
            marked_for_abort: false,
            drain: None,
        }
    }

    /// Move to `state` and recompute read/write status
    pub(crate) fn transition(&mut self, state: ProxyState, now: Instant) {
        self.state = state;
        self.last_transition = now;
        self.read_write = ReadWriteStatus::compute(state, self.service_role);
    }

    pub(crate) fn holds_references(&self) -> bool {
        self.service.is_some() || self.replicator.is_some()
    }

    pub(crate) fn stateful_service(&self) -> Option<Arc<ServiceHandle<S, L>>> {
        self.service
            .as_ref()
            .filter(|h| matches!(***h, ServiceHandle::Stateful(_)))
            .cloned()
    }

    pub(crate) fn stateless_instance(&self) -> Option<Arc<ServiceHandle<S, L>>> {
        self.service
            .as_ref()
            .filter(|h| matches!(***h, ServiceHandle::Stateless(_)))
            .cloned()
    }
}

/// Proxy for one replica of a failover unit
///
/// `S` is the stateful service type, `L` the stateless one, `R` the
/// replicator. A proxy hosts at most one service and one replicator.
pub struct ReplicaProxy<S, L, R, C: Clock = SystemClock> {
    pub(crate) id: ProxyId,
    pub(crate) config: ProxyConfig,
    pub(crate) clock: C,
    pub(crate) matrix: &'static CompatibilityMatrix,
    pub(crate) lock: Arc<ResourceLock>,
    pub(crate) inner: Mutex<ProxyInner<S, L, R>>,
}

impl<S, L, R> ReplicaProxy<S, L, R, SystemClock>
where
    S: StatefulService,
    L: StatelessService,
    R: Replicator,
{
    pub fn new(id: ProxyId, config: ProxyConfig) -> Self {
        Self::with_clock(id, config, SystemClock)
    }
}

impl<S, L, R, C> ReplicaProxy<S, L, R, C>
where
    S: StatefulService,
    L: StatelessService,
    R: Replicator,
    C: Clock,
{
    pub fn with_clock(id: ProxyId, config: ProxyConfig, clock: C) -> Self {
        let now = clock.now();
        Self {
            id,
            config,
            matrix: CompatibilityMatrix::shared(),
            lock: Arc::new(ResourceLock::new(ResourceLockConfig::new(id.lock_name()))),
            inner: Mutex::new(ProxyInner::new(now)),
            clock,
        }
    }

    /// Use a specific compatibility table for action-list admission
    pub fn with_matrix(mut self, matrix: &'static CompatibilityMatrix) -> Self {
        self.matrix = matrix;
        self
    }

    pub fn id(&self) -> ProxyId {
        self.id
    }

    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// The lock guarding this proxy's lifecycle
    pub fn lock(&self) -> &Arc<ResourceLock> {
        &self.lock
    }

    pub fn state(&self) -> ProxyState {
        self.inner().state
    }

    pub fn read_write_status(&self) -> ReadWriteStatus {
        self.inner().read_write
    }

    /// Host a stateful replica, with its replicator if it has one
    ///
    /// Both the service and the replicator start out in `role`.
    pub async fn open_stateful(
        &self,
        service: S,
        replicator: Option<R>,
        role: ReplicaRole,
    ) -> Result<(), ProxyError> {
        let _guard = self.lock.exclusive().await?;
        let mut inner = self.inner();
        self.ensure_closed(&inner, "open a stateful replica")?;

        inner.replicator_state = match replicator {
            Some(_) => ReplicatorState::Opened,
            None => ReplicatorState::Closed,
        };
        inner.replicator = replicator.map(Arc::new);
        inner.service = Some(Arc::new(ServiceHandle::Stateful(service)));
        inner.service_state = ServiceState::Opened;
        inner.service_role = role;
        inner.replicator_role = role;
        inner.transition(ProxyState::Opened, self.clock.now());

        tracing::info!(proxy = %self.id, ?role, has_replicator = inner.replicator.is_some(), "stateful replica opened");
        Ok(())
    }

    /// Host a stateless instance
    pub async fn open_stateless(&self, instance: L) -> Result<(), ProxyError> {
        let _guard = self.lock.exclusive().await?;
        let mut inner = self.inner();
        self.ensure_closed(&inner, "open a stateless instance")?;

        inner.service = Some(Arc::new(ServiceHandle::Stateless(instance)));
        inner.service_state = ServiceState::Opened;
        inner.service_role = ReplicaRole::None;
        inner.replicator_role = ReplicaRole::None;
        inner.transition(ProxyState::Opened, self.clock.now());

        tracing::info!(proxy = %self.id, "stateless instance opened");
        Ok(())
    }

    /// Record the roles reported by the service and the replicator
    ///
    /// Roles that disagree at close time force the abort path.
    pub fn update_roles(&self, service_role: ReplicaRole, replicator_role: ReplicaRole) {
        let mut inner = self.inner();
        inner.service_role = service_role;
        inner.replicator_role = replicator_role;
        inner.read_write = ReadWriteStatus::compute(inner.state, service_role);
        tracing::debug!(proxy = %self.id, ?service_role, ?replicator_role, "roles updated");
    }

    /// Snapshot taken under a shared acquisition of the proxy lock
    pub async fn query(&self) -> Result<ProxySnapshot, ProxyError> {
        let _guard = self.lock.shared().await?;
        Ok(self.snapshot())
    }

    /// Snapshot taken only if the proxy lock is free of lifecycle work
    pub fn try_query(&self) -> Option<ProxySnapshot> {
        let _guard = self.lock.try_shared()?;
        Some(self.snapshot())
    }

    /// True once the proxy has been closed for longer than the cleanup interval
    pub fn try_delete(&self) -> bool {
        let inner = self.inner();
        inner.state == ProxyState::Closed
            && self.clock.elapsed_since(inner.last_transition) > self.config.cleanup_interval
    }

    /// Final check before the proxy is discarded or reused
    pub fn cleanup(&self) {
        let inner = self.inner();
        assert!(
            inner.state == ProxyState::Closed
                && inner.service_state == ServiceState::Closed
                && inner.replicator_state == ReplicatorState::Closed,
            "cleanup of proxy {} in state {}",
            self.id,
            inner.state
        );
        assert!(
            !inner.holds_references(),
            "cleanup of proxy {} still holding references",
            self.id
        );
        assert!(
            inner.executing.is_empty(),
            "cleanup of proxy {} with {} action lists executing",
            self.id,
            inner.executing.len()
        );
        tracing::debug!(proxy = %self.id, "cleaned up");
    }

    fn snapshot(&self) -> ProxySnapshot {
        let inner = self.inner();
        ProxySnapshot {
            id: self.id,
            state: inner.state,
            service_state: inner.service_state,
            replicator_state: inner.replicator_state,
            service_role: inner.service_role,
            replicator_role: inner.replicator_role,
            read_write: inner.read_write,
            service_kind: inner.service.as_ref().map(|h| h.kind()),
            has_replicator: inner.replicator.is_some(),
            executing: inner.executing.iter().map(|l| l.kind).collect(),
            open_for_business: inner.open_for_business,
            marked_for_close: inner.marked_for_close,
            marked_for_abort: inner.marked_for_abort,
        }
    }

    fn ensure_closed(
        &self,
        inner: &ProxyInner<S, L, R>,
        operation: &'static str,
    ) -> Result<(), ProxyError> {
        if inner.state != ProxyState::Closed {
            return Err(ProxyError::InvalidState {
                proxy: self.id,
                state: inner.state,
                operation,
            });
        }
        Ok(())
    }

    pub(crate) fn inner(&self) -> MutexGuard<'_, ProxyInner<S, L, R>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<S, L, R, C: Clock> std::fmt::Debug for ReplicaProxy<S, L, R, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplicaProxy")
            .field("id", &self.id)
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "proxy_tests.rs"]
mod tests;
