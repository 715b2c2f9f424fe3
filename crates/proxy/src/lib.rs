// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! rap-proxy: lifecycle state machine of a replica proxy
//!
//! A [`ReplicaProxy`] owns the service and replicator of one replica. It
//! closes them in order with abort as the fallback, gates concurrent action
//! lists through the compatibility table, and drains them before close.

mod admission;
mod close;
mod error;
mod proxy;
mod resources;
mod state;

pub use admission::Admission;
pub use error::ProxyError;
pub use proxy::{ProxySnapshot, ReplicaProxy};
pub use resources::{ServiceHandle, ServiceKind};
pub use state::{AccessStatus, ProxyState, ReadWriteStatus, ReplicaRole, ReplicatorState, ServiceState};
