// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lifecycle states, roles and derived read/write status

use std::fmt;

/// Lifecycle of the proxy as a whole
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProxyState {
    Opened,
    Closing,
    Closed,
}

impl fmt::Display for ProxyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyState::Opened => write!(f, "opened"),
            ProxyState::Closing => write!(f, "closing"),
            ProxyState::Closed => write!(f, "closed"),
        }
    }
}

/// Lifecycle of the hosted service
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceState {
    Opened,
    Closed,
}

/// Lifecycle of the replicator
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ReplicatorState {
    Opened,
    Closed,
}

/// Role of a replica, as seen by the service or by the replicator
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReplicaRole {
    #[default]
    Unknown,
    /// Stateless instances have no replication role
    None,
    Idle,
    Secondary,
    Primary,
}

/// Whether reads or writes may be served right now
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessStatus {
    Granted,
    NotPrimary,
    /// Transient: the primary is going away, retry elsewhere shortly
    TryAgain,
}

/// Read and write access, recomputed on every lifecycle transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ReadWriteStatus {
    pub read: AccessStatus,
    pub write: AccessStatus,
}

impl ReadWriteStatus {
    pub fn compute(state: ProxyState, service_role: ReplicaRole) -> Self {
        let access = match (state, service_role) {
            (ProxyState::Opened, ReplicaRole::Primary) => AccessStatus::Granted,
            (ProxyState::Closing, ReplicaRole::Primary) => AccessStatus::TryAgain,
            _ => AccessStatus::NotPrimary,
        };
        Self {
            read: access,
            write: access,
        }
    }

    pub fn not_primary() -> Self {
        Self {
            read: AccessStatus::NotPrimary,
            write: AccessStatus::NotPrimary,
        }
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
