// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The service a proxy hosts

use rap_adapters::{ServiceError, StatefulService, StatelessService};

/// Which kind of service a proxy hosts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ServiceKind {
    Stateful,
    Stateless,
}

/// A hosted service: a stateful replica or a stateless instance
pub enum ServiceHandle<S, L> {
    Stateful(S),
    Stateless(L),
}

impl<S: StatefulService, L: StatelessService> ServiceHandle<S, L> {
    pub fn kind(&self) -> ServiceKind {
        match self {
            ServiceHandle::Stateful(_) => ServiceKind::Stateful,
            ServiceHandle::Stateless(_) => ServiceKind::Stateless,
        }
    }

    pub async fn close(&self) -> Result<(), ServiceError> {
        match self {
            ServiceHandle::Stateful(service) => service.close().await,
            ServiceHandle::Stateless(instance) => instance.close().await,
        }
    }

    pub fn abort(&self) {
        match self {
            ServiceHandle::Stateful(service) => service.abort(),
            ServiceHandle::Stateless(instance) => instance.abort(),
        }
    }
}

impl<S, L> std::fmt::Debug for ServiceHandle<S, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceHandle::Stateful(_) => write!(f, "ServiceHandle::Stateful"),
            ServiceHandle::Stateless(_) => write!(f, "ServiceHandle::Stateless"),
        }
    }
}
