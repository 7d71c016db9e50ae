// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use qw_adapters::MemoryStore;
use qw_core::FakeClock;
use serde_json::json;

fn setup() -> (MemoryStore<FakeClock>, FakeClock) {
    let clock = FakeClock::new();
    (MemoryStore::with_clock(clock.clone()), clock)
}

#[tokio::test]
async fn create_writes_waiting_record() {
    let (store, clock) = setup();
    let status = Status::create(store.clone(), clock.clone(), JobId::new("j1"), "")
        .await
        .unwrap();

    assert!(status.is_tracking().await.unwrap());
    assert_eq!(status.status().await.unwrap(), Some(JobStatus::Waiting));
    assert_eq!(status.started().await.unwrap(), Some(clock.epoch_secs()));
    assert_eq!(status.result().await.unwrap(), None);
    assert!(store.exists("job:j1:status").await.unwrap());
}

#[tokio::test]
async fn prefix_is_part_of_the_key() {
    let (store, clock) = setup();
    let status = Status::create(store.clone(), clock, JobId::new("j1"), "app")
        .await
        .unwrap();
    assert_eq!(status.key(), "job:app_j1:status");
    assert!(store.exists("job:app_j1:status").await.unwrap());
}

#[tokio::test]
async fn update_on_untracked_job_is_a_noop() {
    let (store, clock) = setup();
    let status = Status::new(store.clone(), clock, JobId::new("ghost"), "");

    status
        .update(JobStatus::Complete, Some(json!(true)))
        .await
        .unwrap();

    assert_eq!(status.status().await.unwrap(), None);
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn negative_tracking_answer_is_cached() {
    let (store, clock) = setup();
    let status = Status::new(store.clone(), clock.clone(), JobId::new("j1"), "");
    assert!(!status.is_tracking().await.unwrap());

    // Created behind this handle's back: the cached answer stands.
    Status::create(store.clone(), clock.clone(), JobId::new("j1"), "")
        .await
        .unwrap();
    assert!(!status.is_tracking().await.unwrap());

    let fresh = Status::new(store, clock, JobId::new("j1"), "");
    assert!(fresh.is_tracking().await.unwrap());
}

#[tokio::test]
async fn positive_tracking_answer_is_rechecked() {
    let (store, clock) = setup();
    let status = Status::create(store, clock, JobId::new("j1"), "").await.unwrap();
    assert!(status.is_tracking().await.unwrap());
    status.stop().await.unwrap();
    assert!(!status.is_tracking().await.unwrap());
}

#[tokio::test]
async fn update_preserves_started_and_sets_updated() {
    let (store, clock) = setup();
    let status = Status::create(store, clock.clone(), JobId::new("j1"), "")
        .await
        .unwrap();
    let started = clock.epoch_secs();

    clock.advance(Duration::from_secs(30));
    status.update(JobStatus::Running, None).await.unwrap();

    let packet = status.fetch().await.unwrap().unwrap();
    assert_eq!(packet.job_status(), Some(JobStatus::Running));
    assert_eq!(packet.started, Some(started));
    assert_eq!(packet.updated, Some(started + 30));
}

#[yare::parameterized(
    waiting  = { JobStatus::Waiting,  false },
    running  = { JobStatus::Running,  false },
    failed   = { JobStatus::Failed,   true },
    complete = { JobStatus::Complete, true },
)]
fn only_terminal_records_expire(next: JobStatus, expires: bool) {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
        .block_on(async {
            let (store, clock) = setup();
            let status = Status::create(store.clone(), clock.clone(), JobId::new("j1"), "")
                .await
                .unwrap();
            status.update(next, Some(json!({"n": 1}))).await.unwrap();

            // Still readable right after the transition
            assert_eq!(status.status().await.unwrap(), Some(next));
            assert_eq!(status.result().await.unwrap(), Some(json!({"n": 1})));

            clock.advance(Duration::from_secs(TERMINAL_STATUS_TTL_SECS - 1));
            assert!(store.exists("job:j1:status").await.unwrap());

            clock.advance(Duration::from_secs(1));
            assert_eq!(store.exists("job:j1:status").await.unwrap(), !expires);
        });
}

#[tokio::test]
async fn unknown_status_code_is_ignored() {
    let (store, clock) = setup();
    let status = Status::create(store, clock, JobId::new("j1"), "").await.unwrap();
    status.update_code(9, Some(json!("x"))).await.unwrap();
    status.update_code(0, None).await.unwrap();
    assert_eq!(status.status().await.unwrap(), Some(JobStatus::Waiting));

    status.update_code(4, None).await.unwrap();
    assert_eq!(status.status().await.unwrap(), Some(JobStatus::Complete));
}

#[tokio::test]
async fn unreadable_record_reads_as_absent() {
    let (store, clock) = setup();
    store.set("job:j1:status", "not json").await.unwrap();
    let status = Status::new(store, clock, JobId::new("j1"), "");
    assert!(status.is_tracking().await.unwrap());
    assert_eq!(status.fetch().await.unwrap(), None);
}

#[tokio::test]
async fn stop_deletes_unconditionally() {
    let (store, clock) = setup();
    let status = Status::new(store.clone(), clock.clone(), JobId::new("j1"), "");
    assert!(!status.stop().await.unwrap());

    let tracked = Status::create(store.clone(), clock, JobId::new("j1"), "")
        .await
        .unwrap();
    assert!(tracked.stop().await.unwrap());
    assert!(store.keys().is_empty());
}
