// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake service for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ServiceError, StatefulService, StatelessService};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Recorded service call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceCall {
    Close,
    Abort,
}

/// Fake service usable as either a stateful replica or a stateless instance
///
/// Clones share state, so a test can keep a handle after moving the fake
/// into a proxy.
#[derive(Clone, Default)]
pub struct FakeService {
    calls: Arc<Mutex<Vec<ServiceCall>>>,
    close_error: Arc<Mutex<Option<ServiceError>>>,
    close_gate: Arc<Mutex<Option<Arc<Notify>>>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<ServiceCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Make every subsequent close fail with `error`
    pub fn fail_close(&self, error: ServiceError) {
        *self.close_error.lock().unwrap_or_else(|e| e.into_inner()) = Some(error);
    }

    /// Hold subsequent closes pending until [`FakeService::release_close`]
    pub fn hold_close(&self) {
        *self.close_gate.lock().unwrap_or_else(|e| e.into_inner()) = Some(Arc::new(Notify::new()));
    }

    /// Let a held close finish
    pub fn release_close(&self) {
        if let Some(gate) = self
            .close_gate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take()
        {
            gate.notify_one();
        }
    }

    /// True once close has been entered
    pub fn close_started(&self) -> bool {
        self.calls().contains(&ServiceCall::Close)
    }

    fn record(&self, call: ServiceCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }

    async fn do_close(&self) -> Result<(), ServiceError> {
        self.record(ServiceCall::Close);

        let gate = self
            .close_gate
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }

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
}

#[async_trait]
impl StatefulService for FakeService {
    async fn close(&self) -> Result<(), ServiceError> {
        self.do_close().await
    }

    fn abort(&self) {
        self.record(ServiceCall::Abort);
    }
}

#[async_trait]
impl StatelessService for FakeService {
    async fn close(&self) -> Result<(), ServiceError> {
        self.do_close().await
    }

    fn abort(&self) {
        self.record(ServiceCall::Abort);
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
