// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::{setup, single_shot, worker, TestWorker};

#[tokio::test]
async fn id_joins_host_pid_and_queues() {
    let ctx = setup();
    let worker = worker(&ctx, &["high", "low"], single_shot()).await;

    let expected = format!("testhost:{}:high,low", std::process::id());
    assert_eq!(worker.id().as_str(), expected);
    assert_eq!(worker.to_string(), expected);
    assert_eq!(worker.hostname(), "testhost");
    assert_eq!(worker.pid(), std::process::id());
    assert_eq!(worker.state(), WorkerState::Starting);
    assert_eq!(worker.child_pid(), None);
}

#[tokio::test]
async fn wildcard_expands_to_sorted_known_queues() {
    let ctx = setup();
    for queue in ["zeta", "alpha", "mid"] {
        ctx.client.push(queue, &JobPayload::new("Succeed")).await.unwrap();
    }
    let worker = worker(&ctx, &["*"], single_shot()).await;

    assert_eq!(worker.queues(false).await.unwrap(), vec!["*"]);
    assert_eq!(worker.queues(true).await.unwrap(), vec!["alpha", "mid", "zeta"]);
}

#[tokio::test]
async fn explicit_queues_are_kept_in_order() {
    let ctx = setup();
    ctx.client.push("other", &JobPayload::new("Succeed")).await.unwrap();
    let worker = worker(&ctx, &["b", "a"], single_shot()).await;
    assert_eq!(worker.queues(true).await.unwrap(), vec!["b", "a"]);
}

#[tokio::test]
async fn registered_worker_can_be_found() {
    let ctx = setup();
    let worker = worker(&ctx, &["mail", "default"], single_shot()).await;
    worker.register().await.unwrap();

    assert_eq!(
        TestWorker::all(&ctx.client).await.unwrap(),
        vec![worker.id().clone()]
    );
    assert!(TestWorker::exists(&ctx.client, worker.id()).await.unwrap());

    let found = TestWorker::find(&ctx.client, ctx.probe.clone(), worker.id())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id(), worker.id());
    assert_eq!(found.hostname(), "testhost");
    assert_eq!(found.pid(), std::process::id());
    assert_eq!(found.queues(false).await.unwrap(), vec!["mail", "default"]);
    assert!(found.current_job().is_none());
}

#[tokio::test]
async fn unknown_worker_does_not_exist() {
    let ctx = setup();
    let id = WorkerId::new("testhost:1:nothing");
    assert!(!TestWorker::exists(&ctx.client, &id).await.unwrap());
    assert!(TestWorker::find(&ctx.client, ctx.probe.clone(), &id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn working_on_is_recorded_and_cleared() {
    let ctx = setup();
    let mut worker = worker(&ctx, &["default"], single_shot()).await;
    ctx.client
        .enqueue("default", "Succeed", serde_json::json!([1]), true)
        .await
        .unwrap();
    let mut job = JobHandle::reserve(&ctx.client, "default").await.unwrap().unwrap();
    job.worker = Some(worker.id().clone());

    worker.working_on(&job).await;

    assert_eq!(worker.state(), WorkerState::Working);
    let record = worker.job().await.unwrap().unwrap();
    assert_eq!(record.queue, "default");
    assert_eq!(record.payload, job.payload);
    assert_eq!(record.run_at, "2026-01-01T00:00:00+00:00");
    assert_eq!(job.status().await.unwrap(), Some(qw_core::JobStatus::Running));

    worker.done_working().await;

    assert!(worker.job().await.unwrap().is_none());
    assert_eq!(worker.state(), WorkerState::Idle);
    assert_eq!(worker.stat("processed").await.unwrap(), 1);
    assert_eq!(ctx.client.stats().get("processed").await.unwrap(), 1);
}

#[tokio::test]
async fn find_restores_in_flight_job() {
    let ctx = setup();
    let mut worker = worker(&ctx, &["default"], single_shot()).await;
    worker.register().await.unwrap();
    ctx.client.enqueue("default", "Succeed", serde_json::Value::Null, false).await.unwrap();
    let job = JobHandle::reserve(&ctx.client, "default").await.unwrap().unwrap();
    worker.working_on(&job).await;

    let found = TestWorker::find(&ctx.client, ctx.probe.clone(), worker.id())
        .await
        .unwrap()
        .unwrap();
    let restored = found.current_job().unwrap();
    assert_eq!(restored.payload, job.payload);
    assert_eq!(restored.worker.as_ref(), Some(worker.id()));
}
