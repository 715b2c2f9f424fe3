// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifiers of failover units and their replica proxies

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of the partition (failover unit) a replica belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FailoverUnitId(pub Uuid);

impl FailoverUnitId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for FailoverUnitId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FailoverUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifies one replica proxy: a replica of a failover unit
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProxyId {
    pub failover_unit: FailoverUnitId,
    pub replica_id: i64,
}

impl ProxyId {
    pub fn new(failover_unit: FailoverUnitId, replica_id: i64) -> Self {
        Self {
            failover_unit,
            replica_id,
        }
    }

    /// Name of the resource lock guarding this proxy
    pub fn lock_name(&self) -> String {
        format!("proxy:{}", self)
    }
}

impl fmt::Display for ProxyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.failover_unit, self.replica_id)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
