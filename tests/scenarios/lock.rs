// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock scenarios: rundown, batch grant, FIFO and cancellation

use crate::prelude::*;
use rap_core::{AcquireError, AcquireMode, RequestState};
use similar_asserts::assert_eq;

#[test]
fn exclusive_runs_down_shared_holder() {
    let lock = lock("scenario-a");
    assert_eq!(lock.snapshot(), expected(1, false, false, 0));

    // Thread A: shared, granted inline
    let (_a, mut shared) = start(&lock, AcquireMode::Shared);
    assert!(granted(&mut shared));
    assert_eq!(lock.snapshot(), expected(2, false, false, 0));

    // Thread B: exclusive, waits for A
    let (_b, mut exclusive) = start(&lock, AcquireMode::Exclusive);
    assert!(!exclusive.is_complete());
    assert_eq!(lock.snapshot(), expected(1, true, true, 0));

    // A releases: rundown completes and B owns the lock
    lock.release_shared();
    assert!(granted(&mut exclusive));
    assert_eq!(lock.snapshot(), expected(0, true, false, 0));

    lock.release_exclusive();
    assert_eq!(lock.snapshot(), expected(1, false, false, 0));
}

#[test]
fn release_grants_shared_batch_then_runs_down_for_exclusive() {
    let lock = lock("scenario-b");
    let (_holder, mut holder) = start(&lock, AcquireMode::Exclusive);
    assert!(granted(&mut holder));

    let (_r1, mut r1) = start(&lock, AcquireMode::Shared);
    let (_r2, mut r2) = start(&lock, AcquireMode::Shared);
    let (_r3, mut r3) = start(&lock, AcquireMode::Exclusive);
    assert_eq!(lock.snapshot(), expected(0, true, false, 3));

    lock.release_exclusive();

    // Bias plus two grants is 3; the rundown for r3 then drops the bias
    assert!(granted(&mut r1));
    assert!(granted(&mut r2));
    assert!(!r3.is_complete());
    assert_eq!(lock.snapshot(), expected(2, true, true, 0));

    lock.release_shared();
    assert!(!r3.is_complete());
    lock.release_shared();
    assert!(granted(&mut r3));
    assert_eq!(lock.snapshot(), expected(0, true, false, 0));

    lock.release_exclusive();
    assert_eq!(lock.snapshot(), expected(1, false, false, 0));
}

#[test]
fn queued_exclusive_is_served_first() {
    let lock = lock("fifo");
    let (_holder, mut holder) = start(&lock, AcquireMode::Exclusive);
    assert!(granted(&mut holder));

    let (_r1, mut r1) = start(&lock, AcquireMode::Exclusive);
    let (_r2, mut r2) = start(&lock, AcquireMode::Shared);
    let (_r3, mut r3) = start(&lock, AcquireMode::Shared);

    lock.release_exclusive();
    assert!(granted(&mut r1));
    assert!(!r2.is_complete());
    assert!(!r3.is_complete());

    lock.release_exclusive();
    assert!(granted(&mut r2));
    assert!(granted(&mut r3));
    assert_eq!(lock.snapshot(), expected(3, false, false, 0));

    lock.release_shared();
    lock.release_shared();
}

#[test]
fn cancel_is_idempotent_and_leaves_bookkeeping_intact() {
    let lock = lock("cancel");
    let (_holder, mut holder) = start(&lock, AcquireMode::Exclusive);
    assert!(granted(&mut holder));

    let (queued, mut waiting) = start(&lock, AcquireMode::Shared);
    assert!(queued.cancel());
    assert!(!queued.cancel());
    assert_eq!(waiting.try_take(), Some(Err(AcquireError::Cancelled)));
    assert_eq!(queued.state(), RequestState::Cancelled);
    assert_eq!(lock.snapshot(), expected(0, true, false, 0));

    lock.release_exclusive();
    let (done, mut shared) = start(&lock, AcquireMode::Shared);
    assert!(granted(&mut shared));
    let before = lock.snapshot();
    assert!(!done.cancel());
    assert_eq!(lock.snapshot(), before);

    lock.release_shared();
    assert_eq!(lock.snapshot(), expected(1, false, false, 0));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn guards_serialize_writers_across_threads() {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    let lock = lock("writers");
    let total = Arc::new(AtomicU64::new(0));

    let mut tasks = Vec::new();
    for _ in 0..16 {
        let lock = Arc::clone(&lock);
        let total = Arc::clone(&total);
        tasks.push(tokio::spawn(async move {
            for _ in 0..25 {
                let _guard = lock.exclusive().await.unwrap();
                // Non-atomic read-modify-write is safe only under exclusion
                let value = total.load(Ordering::SeqCst);
                tokio::task::yield_now().await;
                total.store(value + 1, Ordering::SeqCst);
            }
        }));
    }
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(total.load(Ordering::SeqCst), 16 * 25);
    assert_eq!(lock.snapshot(), expected(1, false, false, 0));
}
