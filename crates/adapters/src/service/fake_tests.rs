// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;

#[tokio::test]
async fn fake_service_records_close_and_abort() {
    let service = FakeService::new();

    StatefulService::close(&service).await.unwrap();
    StatelessService::abort(&service);

    assert_eq!(service.calls(), vec![ServiceCall::Close, ServiceCall::Abort]);
}

#[tokio::test]
async fn fake_service_close_failure() {
    let service = FakeService::new();
    service.fail_close(ServiceError::CloseFailed("boom".to_string()));

    let err = StatelessService::close(&service).await.unwrap_err();
    assert_eq!(err.to_string(), "close failed: boom");
}

#[tokio::test]
async fn fake_service_clones_share_calls() {
    let service = FakeService::new();
    let handle = service.clone();

    StatefulService::abort(&service);
    assert_eq!(handle.calls(), vec![ServiceCall::Abort]);
}

#[tokio::test]
async fn held_close_waits_for_release() {
    let service = FakeService::new();
    service.hold_close();

    let task = {
        let service = service.clone();
        tokio::spawn(async move { StatefulService::close(&service).await })
    };

    while !service.close_started() {
        tokio::task::yield_now().await;
    }
    tokio::time::sleep(Duration::from_millis(5)).await;
    assert!(!task.is_finished());

    service.release_close();
    task.await.unwrap().unwrap();
}

#[tokio::test]
async fn release_before_close_does_not_block() {
    let service = FakeService::new();
    service.hold_close();
    service.release_close();

    StatefulService::close(&service).await.unwrap();
}
