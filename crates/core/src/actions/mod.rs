// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proxy action lists and their concurrency rules

mod compatibility;

pub use compatibility::CompatibilityMatrix;

use serde::{Deserialize, Serialize};
use std::fmt;

/// A named list of actions the proxy executes against a replica
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Empty,
    StatefulServiceOpenIdle,
    StatefulServiceOpenPrimary,
    StatefulServiceOpenSecondary,
    StatefulServiceReopen,
    StatefulServiceClose,
    StatefulServiceDrop,
    StatefulServiceAbort,
    StatefulServiceChangeRole,
    StatefulServicePromoteToPrimary,
    StatefulServiceDemoteToSecondary,
    StatefulServiceFinishDemoteToSecondary,
    StatefulServiceFinalizeDemoteToSecondary,
    StatefulServiceEndReconfiguration,
    ReplicatorBuildIdleReplica,
    ReplicatorRemoveIdleReplica,
    ReplicatorGetStatus,
    ReplicatorUpdateEpochAndGetStatus,
    ReplicatorUpdateReplicas,
    ReplicatorUpdateAndCatchupQuorum,
    CancelCatchupReplicaSet,
    ReplicatorGetQuery,
    StatelessServiceOpen,
    StatelessServiceClose,
    StatelessServiceAbort,
    UpdateServiceDescription,
}

impl ActionKind {
    /// Every action kind, in declaration order
    pub const ALL: [ActionKind; 26] = [
        ActionKind::Empty,
        ActionKind::StatefulServiceOpenIdle,
        ActionKind::StatefulServiceOpenPrimary,
        ActionKind::StatefulServiceOpenSecondary,
        ActionKind::StatefulServiceReopen,
        ActionKind::StatefulServiceClose,
        ActionKind::StatefulServiceDrop,
        ActionKind::StatefulServiceAbort,
        ActionKind::StatefulServiceChangeRole,
        ActionKind::StatefulServicePromoteToPrimary,
        ActionKind::StatefulServiceDemoteToSecondary,
        ActionKind::StatefulServiceFinishDemoteToSecondary,
        ActionKind::StatefulServiceFinalizeDemoteToSecondary,
        ActionKind::StatefulServiceEndReconfiguration,
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::ReplicatorGetStatus,
        ActionKind::ReplicatorUpdateEpochAndGetStatus,
        ActionKind::ReplicatorUpdateReplicas,
        ActionKind::ReplicatorUpdateAndCatchupQuorum,
        ActionKind::CancelCatchupReplicaSet,
        ActionKind::ReplicatorGetQuery,
        ActionKind::StatelessServiceOpen,
        ActionKind::StatelessServiceClose,
        ActionKind::StatelessServiceAbort,
        ActionKind::UpdateServiceDescription,
    ];

    pub const COUNT: usize = Self::ALL.len();

    pub(crate) fn index(self) -> usize {
        self as usize
    }

    pub fn is_open(self) -> bool {
        matches!(
            self,
            ActionKind::StatefulServiceOpenIdle
                | ActionKind::StatefulServiceOpenPrimary
                | ActionKind::StatefulServiceOpenSecondary
                | ActionKind::StatelessServiceOpen
        )
    }

    /// Close or drop of either service kind
    pub fn is_close(self) -> bool {
        matches!(
            self,
            ActionKind::StatefulServiceClose
                | ActionKind::StatefulServiceDrop
                | ActionKind::StatelessServiceClose
        )
    }

    pub fn is_abort(self) -> bool {
        matches!(
            self,
            ActionKind::StatefulServiceAbort | ActionKind::StatelessServiceAbort
        )
    }

    pub fn is_reopen(self) -> bool {
        self == ActionKind::StatefulServiceReopen
    }

    /// Actions that open, reopen, close or abort the replica
    pub fn is_lifecycle(self) -> bool {
        self.is_open() || self.is_close() || self.is_abort() || self.is_reopen()
    }

    /// Lifecycle actions must run with nothing else executing
    pub fn is_standalone(self) -> bool {
        self.is_lifecycle()
    }

    /// Read-only or descriptive actions that run beside anything but lifecycle
    ///
    /// `ReplicatorGetStatus` is a demote step, not a query, and is excluded.
    pub fn is_benign(self) -> bool {
        matches!(
            self,
            ActionKind::ReplicatorGetQuery | ActionKind::UpdateServiceDescription
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Empty => "Empty",
            ActionKind::StatefulServiceOpenIdle => "StatefulServiceOpenIdle",
            ActionKind::StatefulServiceOpenPrimary => "StatefulServiceOpenPrimary",
            ActionKind::StatefulServiceOpenSecondary => "StatefulServiceOpenSecondary",
            ActionKind::StatefulServiceReopen => "StatefulServiceReopen",
            ActionKind::StatefulServiceClose => "StatefulServiceClose",
            ActionKind::StatefulServiceDrop => "StatefulServiceDrop",
            ActionKind::StatefulServiceAbort => "StatefulServiceAbort",
            ActionKind::StatefulServiceChangeRole => "StatefulServiceChangeRole",
            ActionKind::StatefulServicePromoteToPrimary => "StatefulServicePromoteToPrimary",
            ActionKind::StatefulServiceDemoteToSecondary => "StatefulServiceDemoteToSecondary",
            ActionKind::StatefulServiceFinishDemoteToSecondary => {
                "StatefulServiceFinishDemoteToSecondary"
            }
            ActionKind::StatefulServiceFinalizeDemoteToSecondary => {
                "StatefulServiceFinalizeDemoteToSecondary"
            }
            ActionKind::StatefulServiceEndReconfiguration => "StatefulServiceEndReconfiguration",
            ActionKind::ReplicatorBuildIdleReplica => "ReplicatorBuildIdleReplica",
            ActionKind::ReplicatorRemoveIdleReplica => "ReplicatorRemoveIdleReplica",
            ActionKind::ReplicatorGetStatus => "ReplicatorGetStatus",
            ActionKind::ReplicatorUpdateEpochAndGetStatus => "ReplicatorUpdateEpochAndGetStatus",
            ActionKind::ReplicatorUpdateReplicas => "ReplicatorUpdateReplicas",
            ActionKind::ReplicatorUpdateAndCatchupQuorum => "ReplicatorUpdateAndCatchupQuorum",
            ActionKind::CancelCatchupReplicaSet => "CancelCatchupReplicaSet",
            ActionKind::ReplicatorGetQuery => "ReplicatorGetQuery",
            ActionKind::StatelessServiceOpen => "StatelessServiceOpen",
            ActionKind::StatelessServiceClose => "StatelessServiceClose",
            ActionKind::StatelessServiceAbort => "StatelessServiceAbort",
            ActionKind::UpdateServiceDescription => "UpdateServiceDescription",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
