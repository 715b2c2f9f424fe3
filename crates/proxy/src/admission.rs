// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission of action lists and draining before close
//!
//! Action lists may only start beside the lists already executing when the
//! compatibility table allows it. Standalone (lifecycle) lists need the
//! proxy to themselves: one arriving while others run closes the proxy for
//! business and asks the caller to cancel what is running.

use crate::error::ProxyError;
use crate::proxy::ReplicaProxy;
use rap_adapters::{Replicator, StatefulService, StatelessService};
use rap_core::{ActionKind, Clock};
use tokio::sync::oneshot;

/// An action list currently executing against the proxy
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ActionListInfo {
    pub(crate) kind: ActionKind,
    pub(crate) impacts_availability: bool,
}

/// Outcome of asking to start an action list
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    Rejected,
    /// Rejected, and the executing lists must be cancelled before a retry
    RejectedCancelNeeded,
}

impl<S, L, R, C> ReplicaProxy<S, L, R, C>
where
    S: StatefulService,
    L: StatelessService,
    R: Replicator,
    C: Clock,
{
    /// Try to record `kind` as executing
    ///
    /// An accepted list must be finished with
    /// [`ReplicaProxy::done_executing_action_list`].
    pub fn try_add_action_list(&self, kind: ActionKind, impacts_availability: bool) -> Admission {
        let mut inner = self.inner();

        if inner.marked_for_abort {
            tracing::debug!(proxy = %self.id, %kind, "rejected, marked for abort");
            return Admission::Rejected;
        }

        let compatible = self
            .matrix
            .are_acceptable_for_parallel_execution(inner.executing.iter().map(|l| l.kind), kind);
        if !compatible {
            tracing::debug!(proxy = %self.id, %kind, executing = inner.executing.len(), "rejected, incompatible");
            return Admission::Rejected;
        }

        let info = ActionListInfo {
            kind,
            impacts_availability,
        };

        if !inner.marked_for_close && !kind.is_standalone() {
            if !inner.open_for_business {
                return Admission::Rejected;
            }
            inner.executing.push(info);
            tracing::debug!(proxy = %self.id, %kind, "accepted");
            return Admission::Accepted;
        }

        if !inner.marked_for_close && inner.executing.is_empty() {
            inner.executing.push(info);
            inner.open_for_business = true;
            inner.marked_for_close = kind.is_close();
            inner.marked_for_abort = kind.is_abort();
            tracing::debug!(proxy = %self.id, %kind, "accepted standalone");
            return Admission::Accepted;
        }

        let is_abort = kind.is_abort();
        if (!inner.marked_for_close && inner.open_for_business) || is_abort {
            inner.marked_for_close = false;
            inner.open_for_business = false;
            tracing::info!(proxy = %self.id, %kind, executing = inner.executing.len(), "closed for business, cancel needed");
            return Admission::RejectedCancelNeeded;
        }

        Admission::Rejected
    }

    /// Record that an accepted action list has finished
    ///
    /// Completes a pending drain when the last list finishes.
    pub fn done_executing_action_list(&self, kind: ActionKind) {
        let drain = {
            let mut inner = self.inner();
            let position = inner.executing.iter().position(|l| l.kind == kind);
            assert!(
                position.is_some(),
                "action list {} finished on proxy {} but was not executing",
                kind,
                self.id
            );
            inner.executing.remove(position.unwrap_or_default());

            if inner.executing.is_empty() && inner.drain.is_some() {
                inner.open_for_business = true;
                inner.drain.take()
            } else {
                None
            }
        };

        tracing::debug!(proxy = %self.id, %kind, "action list done");
        if let Some(drain) = drain {
            tracing::debug!(proxy = %self.id, "drained");
            let _ = drain.send(Ok(()));
        }
    }

    /// True while any executing action list impacts service availability
    pub fn is_service_availability_impacted(&self) -> bool {
        self.inner()
            .executing
            .iter()
            .any(|l| l.impacts_availability)
    }

    /// Close the proxy for business and wait until no action lists execute
    ///
    /// A newer drain request cancels an older pending one.
    pub async fn mark_for_close_and_drain(&self, is_abort: bool) -> Result<(), ProxyError> {
        let (tx, rx) = oneshot::channel();

        let (previous, drained) = {
            let mut inner = self.inner();
            let previous = inner.drain.replace(tx);

            if is_abort {
                if !inner.marked_for_abort {
                    inner.marked_for_close = false;
                    inner.marked_for_abort = true;
                    inner.open_for_business = false;
                }
            } else if !inner.marked_for_close && !inner.marked_for_abort {
                inner.marked_for_close = true;
                inner.open_for_business = false;
            }

            let drained = if inner.executing.is_empty() {
                inner.open_for_business = true;
                inner.drain.take()
            } else {
                None
            };
            (previous, drained)
        };

        if let Some(previous) = previous {
            tracing::debug!(proxy = %self.id, "previous drain cancelled");
            let _ = previous.send(Err(ProxyError::DrainCancelled));
        }
        if let Some(drained) = drained {
            let _ = drained.send(Ok(()));
        }

        tracing::info!(proxy = %self.id, is_abort, "draining");
        let wait = async { rx.await.unwrap_or(Err(ProxyError::DrainCancelled)) };
        let Some(timeout) = self.config.drain_timeout else {
            return wait.await;
        };

        match tokio::time::timeout(timeout, wait).await {
            Ok(result) => result,
            Err(_) => {
                let mut inner = self.inner();
                // Our receiver is gone, so a closed sender is ours
                if inner.drain.as_ref().is_some_and(|tx| tx.is_closed()) {
                    inner.drain = None;
                }
                let pending = inner.executing.len();
                tracing::warn!(proxy = %self.id, pending, "drain timed out");
                Err(ProxyError::DrainTimedOut { pending })
            }
        }
    }
}

#[cfg(test)]
#[path = "admission_tests.rs"]
mod tests;
