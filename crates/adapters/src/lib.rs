// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Collaborators a replica proxy drives: services and replicators

pub mod replicator;
pub mod service;
pub mod traced;

pub use replicator::{Replicator, ReplicatorError};
pub use service::{ServiceError, StatefulService, StatelessService};
pub use traced::{TracedReplicator, TracedStatefulService, TracedStatelessService};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use replicator::{FakeReplicator, ReplicatorCall};
#[cfg(any(test, feature = "test-support"))]
pub use service::{FakeService, ServiceCall};
