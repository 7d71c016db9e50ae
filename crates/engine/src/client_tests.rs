// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_helpers::setup;
use serde_json::json;

#[tokio::test]
async fn push_registers_queue_and_appends() {
    let ctx = setup();
    let client = &ctx.client;

    client.push("mail", &JobPayload::new("Mailer")).await.unwrap();
    client.push("mail", &JobPayload::new("Digest")).await.unwrap();

    assert_eq!(client.size("mail").await.unwrap(), 2);
    assert_eq!(client.queues().await.unwrap(), vec!["mail".to_string()]);
    assert_eq!(client.pop("mail").await.unwrap().unwrap().class, "Mailer");
    assert_eq!(client.pop("mail").await.unwrap().unwrap().class, "Digest");
    assert!(client.pop("mail").await.unwrap().is_none());
}

#[tokio::test]
async fn queues_are_sorted() {
    let ctx = setup();
    for queue in ["low", "high", "medium"] {
        ctx.client.push(queue, &JobPayload::new("Succeed")).await.unwrap();
    }
    assert_eq!(ctx.client.queues().await.unwrap(), vec!["high", "low", "medium"]);
}

#[tokio::test]
async fn remove_queue_drops_pending_jobs() {
    let ctx = setup();
    ctx.client.push("gone", &JobPayload::new("Succeed")).await.unwrap();
    ctx.client.push("gone", &JobPayload::new("Succeed")).await.unwrap();

    assert_eq!(ctx.client.remove_queue("gone").await.unwrap(), 2);
    assert_eq!(ctx.client.size("gone").await.unwrap(), 0);
    assert!(ctx.client.queues().await.unwrap().is_empty());
}

#[tokio::test]
async fn blpop_honours_queue_order() {
    let ctx = setup();
    let client = &ctx.client;
    client.push("low", &JobPayload::new("Low")).await.unwrap();
    client.push("medium", &JobPayload::new("Medium")).await.unwrap();
    client.push("high", &JobPayload::new("High")).await.unwrap();

    let order: Vec<String> = ["high", "medium", "low"].iter().map(|q| q.to_string()).collect();
    let mut seen = Vec::new();
    while let Some((queue, payload)) = client.blpop(&order, Duration::ZERO).await.unwrap() {
        seen.push((queue, payload.class));
    }
    assert_eq!(
        seen,
        vec![
            ("high".to_string(), "High".to_string()),
            ("medium".to_string(), "Medium".to_string()),
            ("low".to_string(), "Low".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn blpop_times_out_on_empty_queues() {
    let ctx = setup();
    let got = ctx
        .client
        .blpop(&["empty".to_string()], Duration::from_secs(5))
        .await
        .unwrap();
    assert!(got.is_none());
}

#[tokio::test]
async fn malformed_payload_surfaces_as_error() {
    let ctx = setup();
    ctx.store.rpush("queue:bad", "{not json").await.unwrap();
    let err = ctx.client.pop("bad").await.unwrap_err();
    assert!(matches!(err, EngineError::Malformed(_)));
}

#[tokio::test]
async fn enqueue_without_monitor_leaves_no_status() {
    let ctx = setup();
    let id = ctx
        .client
        .enqueue("default", "Succeed", json!([1, 2]), false)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(id.as_str(), "job-1");
    assert!(!ctx.client.status(&id, "").is_tracking().await.unwrap());

    let payload = ctx.client.pop("default").await.unwrap().unwrap();
    assert_eq!(payload.id, Some(id));
    assert_eq!(payload.args, vec![json!(1), json!(2)]);
    assert!(payload.queue_time.is_some());
}

#[tokio::test]
async fn enqueue_with_monitor_starts_waiting() {
    let ctx = setup();
    let id = ctx
        .client
        .enqueue("default", "Succeed", Value::Null, true)
        .await
        .unwrap()
        .unwrap();

    let status = ctx.client.status(&id, "");
    assert_eq!(status.status().await.unwrap(), Some(qw_core::JobStatus::Waiting));
}

#[tokio::test]
async fn generated_ids_are_unique() {
    let ctx = setup();
    let a = ctx.client.generate_job_id();
    let b = ctx.client.generate_job_id();
    assert_ne!(a, b);
}

#[tokio::test]
async fn default_client_uses_random_ids() {
    let client = Client::new(qw_adapters::MemoryStore::new());
    assert_eq!(client.generate_job_id().as_str().len(), 32);
    client.ping().await.unwrap();
}
