// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Concurrent-execution compatibility table for action lists
//!
//! `compatible[running][requested]` answers whether `requested` may start
//! while `running` is executing. The table is built once and never mutated,
//! so lookups need no synchronization.

use super::ActionKind;
use std::sync::OnceLock;

type Table = [[bool; ActionKind::COUNT]; ActionKind::COUNT];

/// Replication-maintenance pairs that may overlap, in both directions
const MAINTENANCE_ALLOW_LIST: &[(ActionKind, ActionKind)] = &[
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::ReplicatorBuildIdleReplica,
    ),
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::ReplicatorRemoveIdleReplica,
    ),
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::ReplicatorUpdateReplicas,
    ),
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::ReplicatorUpdateAndCatchupQuorum,
    ),
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::CancelCatchupReplicaSet,
    ),
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::StatefulServicePromoteToPrimary,
    ),
    (
        ActionKind::ReplicatorBuildIdleReplica,
        ActionKind::StatefulServiceDemoteToSecondary,
    ),
    (
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::ReplicatorRemoveIdleReplica,
    ),
    (
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::ReplicatorUpdateReplicas,
    ),
    (
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::ReplicatorUpdateAndCatchupQuorum,
    ),
    (
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::CancelCatchupReplicaSet,
    ),
    (
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::StatefulServicePromoteToPrimary,
    ),
    (
        ActionKind::ReplicatorRemoveIdleReplica,
        ActionKind::StatefulServiceDemoteToSecondary,
    ),
    (
        ActionKind::ReplicatorUpdateAndCatchupQuorum,
        ActionKind::CancelCatchupReplicaSet,
    ),
    (
        ActionKind::StatefulServiceDemoteToSecondary,
        ActionKind::CancelCatchupReplicaSet,
    ),
];

/// Immutable compatibility table
#[derive(Clone, Debug)]
pub struct CompatibilityMatrix {
    compatible: Table,
}

impl CompatibilityMatrix {
    pub fn new() -> Self {
        let mut compatible = [[false; ActionKind::COUNT]; ActionKind::COUNT];

        allow_empty(&mut compatible);
        allow_abort(&mut compatible);
        allow_close(&mut compatible);
        allow_reopen(&mut compatible);
        allow_benign(&mut compatible);
        allow_maintenance(&mut compatible);

        Self { compatible }
    }

    /// Process-wide table, built on first use
    pub fn shared() -> &'static CompatibilityMatrix {
        static MATRIX: OnceLock<CompatibilityMatrix> = OnceLock::new();
        MATRIX.get_or_init(CompatibilityMatrix::new)
    }

    /// Can `requested` start while `running` is executing?
    pub fn can_execute_concurrently(&self, running: ActionKind, requested: ActionKind) -> bool {
        self.compatible[running.index()][requested.index()]
    }

    /// Can `requested` start beside every list in `running`?
    pub fn are_acceptable_for_parallel_execution<I>(&self, running: I, requested: ActionKind) -> bool
    where
        I: IntoIterator<Item = ActionKind>,
    {
        running
            .into_iter()
            .all(|r| self.can_execute_concurrently(r, requested))
    }
}

impl Default for CompatibilityMatrix {
    fn default() -> Self {
        Self::new()
    }
}

fn allow(table: &mut Table, running: ActionKind, requested: ActionKind) {
    table[running.index()][requested.index()] = true;
}

fn allow_empty(table: &mut Table) {
    for kind in ActionKind::ALL {
        allow(table, ActionKind::Empty, kind);
        allow(table, kind, ActionKind::Empty);
    }
}

fn allow_abort(table: &mut Table) {
    for abort in ActionKind::ALL.into_iter().filter(|k| k.is_abort()) {
        for running in ActionKind::ALL {
            if running != abort {
                allow(table, running, abort);
            }
        }
    }
}

fn allow_close(table: &mut Table) {
    for close in ActionKind::ALL.into_iter().filter(|k| k.is_close()) {
        for running in ActionKind::ALL {
            if !running.is_close() && !running.is_abort() {
                allow(table, running, close);
            }
        }
    }
}

fn allow_reopen(table: &mut Table) {
    for reopen in ActionKind::ALL.into_iter().filter(|k| k.is_reopen()) {
        for running in ActionKind::ALL {
            if !running.is_reopen() && !running.is_close() && !running.is_abort() {
                allow(table, running, reopen);
            }
        }
    }
}

fn allow_benign(table: &mut Table) {
    for benign in ActionKind::ALL.into_iter().filter(|k| k.is_benign()) {
        for other in ActionKind::ALL {
            if other == benign || other.is_lifecycle() {
                continue;
            }
            allow(table, other, benign);
            allow(table, benign, other);
        }
    }
}

fn allow_maintenance(table: &mut Table) {
    for &(a, b) in MAINTENANCE_ALLOW_LIST {
        allow(table, a, b);
        allow(table, b, a);
    }
}

#[cfg(test)]
#[path = "compatibility_tests.rs"]
mod tests;
