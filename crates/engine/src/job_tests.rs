// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::error::FailureKind;
use crate::factory::FactoryError;
use crate::test_helpers::{setup, TestClient, TestStore};
use qw_core::FakeClock;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

fn recorder(
    log: &Arc<Mutex<Vec<String>>>,
    tag: &'static str,
) -> impl Fn(&Event<'_>) -> Result<(), HookError> + Send + Sync + 'static {
    let log = Arc::clone(log);
    move |_: &Event<'_>| {
        log.lock().push(tag.to_string());
        Ok(())
    }
}

async fn reserve_one(client: &TestClient, queue: &str) -> JobHandle<TestStore, FakeClock> {
    JobHandle::reserve(client, queue).await.unwrap().unwrap()
}

#[tokio::test]
async fn create_then_reserve_round_trips() {
    let ctx = setup();
    let id = JobHandle::create(
        &ctx.client,
        NewJob::new("default", "Succeed").with_args(json!([{"to": "a@example.com"}])),
    )
    .await
    .unwrap()
    .unwrap();

    let job = reserve_one(&ctx.client, "default").await;
    assert_eq!(job.id(), Some(&id));
    assert_eq!(job.queue, "default");
    assert_eq!(job.payload.class, "Succeed");
    assert_eq!(job.args(), &[json!({"to": "a@example.com"})]);
    assert!(JobHandle::reserve(&ctx.client, "default").await.unwrap().is_none());
}

#[tokio::test]
async fn explicit_id_and_prefix_are_kept() {
    let ctx = setup();
    let id = JobHandle::create(
        &ctx.client,
        NewJob::new("default", "Succeed")
            .with_id("custom")
            .with_prefix("app")
            .monitored(),
    )
    .await
    .unwrap()
    .unwrap();

    assert_eq!(id.as_str(), "custom");
    assert!(ctx.store.exists("job:app_custom:status").await.unwrap());
    let job = reserve_one(&ctx.client, "default").await;
    assert_eq!(job.prefix(), "app");
    assert_eq!(job.status().await.unwrap(), Some(JobStatus::Waiting));
}

#[yare::parameterized(
    string = { json!("nope") },
    number = { json!(3) },
    object = { json!({"a": 1}) },
)]
#[test_macro(tokio::test)]
async fn non_array_args_are_rejected(args: Value) {
    let ctx = setup();
    let err = JobHandle::create(&ctx.client, NewJob::new("default", "Succeed").with_args(args))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidArgs(_)));
    assert_eq!(ctx.client.size("default").await.unwrap(), 0);
}

#[tokio::test]
async fn before_enqueue_veto_pushes_nothing() {
    let ctx = setup();
    let log = Arc::new(Mutex::new(Vec::new()));
    ctx.client
        .events()
        .listen(Hook::BeforeEnqueue, |_: &Event<'_>| Err(HookError::DoNotCreate));
    ctx.client
        .events()
        .listen(Hook::AfterEnqueue, recorder(&log, "after"));

    let created = JobHandle::create(&ctx.client, NewJob::new("default", "Succeed"))
        .await
        .unwrap();

    assert!(created.is_none());
    assert_eq!(ctx.client.size("default").await.unwrap(), 0);
    assert!(log.lock().is_empty());
}

#[tokio::test]
async fn before_enqueue_error_is_reported() {
    let ctx = setup();
    ctx.client.events().listen(Hook::BeforeEnqueue, |_: &Event<'_>| {
        Err(HookError::failed("quota exceeded"))
    });

    let err = JobHandle::create(&ctx.client, NewJob::new("default", "Succeed"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Listener(ref m) if m.contains("quota exceeded")));
    assert_eq!(ctx.client.size("default").await.unwrap(), 0);
}

#[tokio::test]
async fn enqueue_listeners_see_the_job() {
    let ctx = setup();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ctx.client.events().listen(Hook::AfterEnqueue, move |event: &Event<'_>| {
        if let Event::Enqueue { queue, class, args, id } = event {
            sink.lock().push(format!("{queue} {class} {} {id}", args.len()));
        }
        Ok(())
    });

    ctx.client
        .enqueue("mail", "Succeed", json!(["x"]), false)
        .await
        .unwrap();
    assert_eq!(*seen.lock(), vec!["mail Succeed 1 job-1".to_string()]);
}

#[tokio::test]
async fn perform_runs_lifecycle_in_order() {
    let ctx = setup();
    let log = Arc::new(Mutex::new(Vec::new()));
    ctx.client
        .events()
        .listen(Hook::BeforePerform, recorder(&log, "beforePerform"));
    ctx.client
        .events()
        .listen(Hook::AfterPerform, recorder(&log, "afterPerform"));
    ctx.client.enqueue("default", "Lifecycle", Value::Null, false).await.unwrap();

    let mut job = reserve_one(&ctx.client, "default").await;
    let outcome = job.perform().await.unwrap();

    assert_eq!(outcome, Performed::Completed(json!({"args": []})));
    assert_eq!(
        ctx.journal.entries(),
        vec!["set_up", "perform Lifecycle", "tear_down"]
    );
    assert_eq!(*log.lock(), vec!["beforePerform", "afterPerform"]);
}

#[tokio::test]
async fn before_perform_veto_skips_the_job() {
    let ctx = setup();
    ctx.client
        .events()
        .listen(Hook::BeforePerform, |_: &Event<'_>| Err(HookError::DoNotPerform));
    ctx.client.enqueue("default", "Succeed", Value::Null, false).await.unwrap();

    let mut job = reserve_one(&ctx.client, "default").await;
    assert_eq!(job.perform().await.unwrap(), Performed::Vetoed);
    assert!(ctx.journal.entries().is_empty());
}

#[tokio::test]
async fn set_up_veto_skips_perform() {
    let ctx = setup();
    ctx.client.enqueue("default", "Decline", Value::Null, false).await.unwrap();

    let mut job = reserve_one(&ctx.client, "default").await;
    assert_eq!(job.perform().await.unwrap(), Performed::Vetoed);
    assert!(ctx.journal.entries().is_empty());
}

#[tokio::test]
async fn failing_job_reports_exception() {
    let ctx = setup();
    ctx.client.enqueue("default", "Fail", Value::Null, false).await.unwrap();

    let mut job = reserve_one(&ctx.client, "default").await;
    let err = job.perform().await.unwrap_err();
    assert!(matches!(err, JobError::Exception(ref m) if m == "boom"));
}

#[tokio::test]
async fn unknown_class_is_a_factory_error() {
    let ctx = setup();
    ctx.client.enqueue("default", "Missing", Value::Null, false).await.unwrap();

    let mut job = reserve_one(&ctx.client, "default").await;
    let err = job.perform().await.unwrap_err();
    assert!(matches!(err, JobError::Factory(FactoryError::NotFound(ref c)) if c == "Missing"));
}

#[tokio::test]
async fn fail_records_everything() {
    let ctx = setup();
    let worker = WorkerId::compose("testhost", 42, &["default"]);
    let id = ctx
        .client
        .enqueue("default", "Fail", Value::Null, true)
        .await
        .unwrap()
        .unwrap();
    ctx.client.pids().create(&id, 4242).await.unwrap();

    let failures_seen = Arc::new(Mutex::new(Vec::new()));
    ctx.client
        .events()
        .listen(Hook::OnFailure, recorder(&failures_seen, "onFailure"));

    let mut job = reserve_one(&ctx.client, "default").await;
    job.worker = Some(worker.clone());
    job.fail(&JobError::exception("boom")).await;

    assert_eq!(*failures_seen.lock(), vec!["onFailure"]);
    assert_eq!(job.status().await.unwrap(), Some(JobStatus::Failed));
    assert_eq!(ctx.client.pids().get(&id).await.unwrap(), 0);
    assert_eq!(ctx.client.stats().get("failed").await.unwrap(), 1);
    let scoped = qw_core::keys::worker_stat("failed", &worker);
    assert_eq!(ctx.client.stats().get(&scoped).await.unwrap(), 1);

    let recorded = ctx.client.failures().all().await.unwrap();
    assert_eq!(recorded.len(), 1);
    assert_eq!(recorded[0].kind, FailureKind::Exception);
    assert_eq!(recorded[0].error, "boom");
    assert_eq!(recorded[0].worker, worker.as_str());
    assert_eq!(recorded[0].queue, "default");
}

#[tokio::test]
async fn fail_survives_listener_errors() {
    let ctx = setup();
    ctx.client
        .events()
        .listen(Hook::OnFailure, |_: &Event<'_>| Err(HookError::failed("nope")));
    ctx.client.enqueue("default", "Fail", Value::Null, false).await.unwrap();

    let job = reserve_one(&ctx.client, "default").await;
    job.fail(&JobError::DirtyExit("gone".into())).await;

    assert_eq!(ctx.client.failures().count().await.unwrap(), 1);
    assert_eq!(ctx.client.stats().get("failed").await.unwrap(), 1);
}

#[tokio::test]
async fn untracked_status_update_is_a_no_op() {
    let ctx = setup();
    ctx.client.enqueue("default", "Succeed", Value::Null, false).await.unwrap();

    let job = reserve_one(&ctx.client, "default").await;
    job.update_status(JobStatus::Running, None).await.unwrap();
    assert_eq!(job.status().await.unwrap(), None);
    assert!(ctx.store.keys().iter().all(|k| !k.ends_with(":status")));
}

#[tokio::test]
async fn recreate_keeps_monitoring() {
    let ctx = setup();
    ctx.client.enqueue("default", "Succeed", json!([7]), true).await.unwrap();
    let job = reserve_one(&ctx.client, "default").await;

    let new_id = job.recreate().await.unwrap().unwrap();
    assert_ne!(Some(&new_id), job.id());

    let again = reserve_one(&ctx.client, "default").await;
    assert_eq!(again.id(), Some(&new_id));
    assert_eq!(again.args(), &[json!(7)]);
    assert_eq!(again.status().await.unwrap(), Some(JobStatus::Waiting));
}

#[tokio::test]
async fn recreate_untracked_stays_untracked() {
    let ctx = setup();
    ctx.client.enqueue("default", "Succeed", Value::Null, false).await.unwrap();
    let job = reserve_one(&ctx.client, "default").await;

    job.recreate().await.unwrap().unwrap();
    let again = reserve_one(&ctx.client, "default").await;
    assert_eq!(again.status().await.unwrap(), None);
}

#[yare::parameterized(
    with_args = { vec![json!(1), json!("a")], "(Job{mail} | ID: j1 | Mailer | [[1,\"a\"]])" },
    no_args   = { vec![], "(Job{mail} | ID: j1 | Mailer)" },
)]
fn display_format(args: Vec<Value>, expected: &str) {
    let ctx = setup();
    let payload = JobPayload::new("Mailer").with_args(args).with_id("j1");
    let job = JobHandle::new(ctx.client.clone(), "mail", payload);
    assert_eq!(job.to_string(), expected);
}
