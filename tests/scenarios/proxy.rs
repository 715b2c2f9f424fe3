// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Proxy scenarios: close sequencing over the lock

use rap_adapters::{
    FakeReplicator, FakeService, ReplicatorCall, ServiceCall, ServiceError, TracedReplicator,
    TracedStatefulService, TracedStatelessService,
};
use rap_core::{ActionKind, FailoverUnitId, ProxyConfig, ProxyId};
use rap_proxy::{Admission, ProxyState, ReplicaProxy, ReplicaRole};
use similar_asserts::assert_eq;
use std::sync::Arc;
use tokio::sync::oneshot;

type Proxy = ReplicaProxy<
    TracedStatefulService<FakeService>,
    TracedStatelessService<FakeService>,
    TracedReplicator<FakeReplicator>,
>;

fn proxy() -> Arc<Proxy> {
    let id = ProxyId::new(FailoverUnitId::new(), 42);
    Arc::new(ReplicaProxy::new(id, ProxyConfig::default()))
}

#[tokio::test]
async fn close_of_stateful_only_proxy_completes_after_replica_close() {
    let proxy = proxy();
    let service = FakeService::new();
    service.hold_close();
    proxy
        .open_stateful(
            TracedStatefulService::new(service.clone()),
            None,
            ReplicaRole::Primary,
        )
        .await
        .unwrap();

    let (tx, rx) = oneshot::channel();
    let task = proxy.begin_close(move |result| {
        let _ = tx.send(result);
    });

    // Instance and replicator steps had nothing to do; the replica close is pending
    while !service.close_started() {
        tokio::task::yield_now().await;
    }
    assert_eq!(proxy.state(), ProxyState::Closing);

    service.release_close();
    task.await.unwrap();

    assert_eq!(rx.await.unwrap(), Ok(()));
    let snapshot = proxy.query().await.unwrap();
    assert_eq!(snapshot.state, ProxyState::Closed);
    assert_eq!(snapshot.service_kind, None);
    assert_eq!(service.calls(), vec![ServiceCall::Close]);
}

#[tokio::test]
async fn failed_closes_are_absorbed_and_report_success() {
    let proxy = proxy();
    let service = FakeService::new();
    service.fail_close(ServiceError::CloseFailed("torn down".to_string()));
    let replicator = FakeReplicator::new();
    proxy
        .open_stateful(
            TracedStatefulService::new(service.clone()),
            Some(TracedReplicator::new(replicator.clone())),
            ReplicaRole::Secondary,
        )
        .await
        .unwrap();

    proxy.close().await.unwrap();

    assert_eq!(service.calls(), vec![ServiceCall::Close, ServiceCall::Abort]);
    assert_eq!(replicator.calls(), vec![ReplicatorCall::Close]);
    let snapshot = proxy.query().await.unwrap();
    assert_eq!(snapshot.service_kind, None);
    assert!(!snapshot.has_replicator);
    proxy.cleanup();
}

#[tokio::test]
async fn role_mismatch_takes_abort_path() {
    let proxy = proxy();
    let service = FakeService::new();
    let replicator = FakeReplicator::new();
    proxy
        .open_stateful(
            TracedStatefulService::new(service.clone()),
            Some(TracedReplicator::new(replicator.clone())),
            ReplicaRole::Primary,
        )
        .await
        .unwrap();
    proxy.update_roles(ReplicaRole::Primary, ReplicaRole::Idle);

    proxy.close().await.unwrap();

    assert_eq!(service.calls(), vec![ServiceCall::Abort]);
    assert_eq!(replicator.calls(), vec![ReplicatorCall::Abort]);
}

#[tokio::test]
async fn drained_close_admitted_through_compatibility_table() {
    let proxy = proxy();
    let instance = FakeService::new();
    proxy
        .open_stateless(TracedStatelessService::new(instance.clone()))
        .await
        .unwrap();

    assert_eq!(
        proxy.try_add_action_list(ActionKind::UpdateServiceDescription, false),
        Admission::Accepted
    );
    assert_eq!(
        proxy.try_add_action_list(ActionKind::StatelessServiceClose, false),
        Admission::RejectedCancelNeeded
    );

    let drain = {
        let proxy = Arc::clone(&proxy);
        tokio::spawn(async move { proxy.mark_for_close_and_drain(false).await })
    };
    while !proxy.try_query().unwrap().marked_for_close {
        tokio::task::yield_now().await;
    }
    proxy.done_executing_action_list(ActionKind::UpdateServiceDescription);
    drain.await.unwrap().unwrap();

    proxy.close().await.unwrap();
    assert_eq!(instance.calls(), vec![ServiceCall::Close]);
    assert_eq!(proxy.state(), ProxyState::Closed);
}
