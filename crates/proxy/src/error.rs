// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors returned by proxy operations

use crate::state::ProxyState;
use rap_core::{AcquireError, ProxyId};
use thiserror::Error;

/// Errors from proxy operations
///
/// Service and replicator failures during close or abort never surface
/// here; they are absorbed by aborting the failed resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    #[error("proxy lock not acquired: {0}")]
    Lock(#[from] AcquireError),
    #[error("proxy {proxy} is {state}, cannot {operation}")]
    InvalidState {
        proxy: ProxyId,
        state: ProxyState,
        operation: &'static str,
    },
    #[error("close of proxy {proxy} stopped by runtime shutdown")]
    CloseInterrupted { proxy: ProxyId },
    #[error("drain cancelled by a newer drain request")]
    DrainCancelled,
    #[error("drain timed out with {pending} action lists still executing")]
    DrainTimedOut { pending: usize },
}
