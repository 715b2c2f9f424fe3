// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake replicator for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{Replicator, ReplicatorError};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// Recorded replicator call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplicatorCall {
    Close,
    Abort,
}

/// Fake replicator for testing
#[derive(Clone, Default)]
pub struct FakeReplicator {
    calls: Arc<Mutex<Vec<ReplicatorCall>>>,
    close_error: Arc<Mutex<Option<ReplicatorError>>>,
}

impl FakeReplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ReplicatorCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent close fail with `error`
    pub fn fail_close(&self, error: ReplicatorError) {
        *self.close_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    fn record(&self, call: ReplicatorCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

#[async_trait]
impl Replicator for FakeReplicator {
    async fn close(&self) -> Result<(), ReplicatorError> {
        self.record(ReplicatorCall::Close);
        match self
            .close_error
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
        {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn abort(&self) {
        self.record(ReplicatorCall::Abort);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
