// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for the engine crate.

use crate::config::{Isolation, WorkerConfig};
use crate::factory::{JobArgs, Perform, PerformError, Registry};
use crate::worker::Worker;
use crate::Client;
use async_trait::async_trait;
use parking_lot::Mutex;
use qw_adapters::{FakeProbe, MemoryStore};
use qw_core::{FakeClock, SequentialIdGen};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub(crate) type TestStore = MemoryStore<FakeClock>;
pub(crate) type TestClient = Client<TestStore, FakeClock>;
pub(crate) type TestWorker = Worker<TestStore, FakeProbe, FakeClock>;

/// Ordered log of what test jobs did
#[derive(Clone, Default)]
pub(crate) struct Journal {
    entries: Arc<Mutex<Vec<String>>>,
}

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.entries.lock().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().clone()
    }
}

/// Test context holding the client and the fakes behind it.
pub(crate) struct TestContext {
    pub client: TestClient,
    pub store: TestStore,
    pub clock: FakeClock,
    pub registry: Registry,
    pub probe: FakeProbe,
    pub journal: Journal,
}

struct Scripted {
    class: String,
    args: Vec<Value>,
    journal: Journal,
}

#[async_trait]
impl Perform for Scripted {
    async fn set_up(&mut self) -> Result<(), PerformError> {
        if self.class == "Decline" {
            return Err(PerformError::DoNotPerform);
        }
        if self.class == "Lifecycle" {
            self.journal.push("set_up");
        }
        Ok(())
    }

    async fn perform(&mut self) -> Result<Value, PerformError> {
        self.journal.push(format!("perform {}", self.class));
        match self.class.as_str() {
            "Fail" => Err(PerformError::failed("boom")),
            "Panic" => panic!("kaboom"),
            "Sleep" => {
                let ms = self.args.first().and_then(Value::as_u64).unwrap_or(60_000);
                tokio::time::sleep(Duration::from_millis(ms)).await;
                Ok(Value::Null)
            }
            _ => Ok(json!({ "args": self.args })),
        }
    }

    async fn tear_down(&mut self) -> Result<(), PerformError> {
        if self.class == "Lifecycle" {
            self.journal.push("tear_down");
        }
        Ok(())
    }
}

/// Register the scripted job classes: `Succeed`, `Fail`, `Panic`,
/// `Decline`, `Sleep` (args[0] ms) and `Lifecycle`.
pub(crate) fn scripted_registry(journal: &Journal) -> Registry {
    let registry = Registry::new();
    for class in ["Succeed", "Fail", "Panic", "Decline", "Sleep", "Lifecycle"] {
        let journal = journal.clone();
        registry.register(class, move |job: JobArgs| Scripted {
            class: job.class,
            args: job.args,
            journal: journal.clone(),
        });
    }
    registry
}

/// Client over an in-memory store with a fake clock, sequential ids and
/// the scripted job classes.
pub(crate) fn setup() -> TestContext {
    let clock = FakeClock::new();
    let store = MemoryStore::with_clock(clock.clone());
    let journal = Journal::default();
    let registry = scripted_registry(&journal);
    let client = Client::with_clock(store.clone(), clock.clone())
        .with_factory(registry.clone())
        .with_id_gen(SequentialIdGen::default());
    TestContext {
        client,
        store,
        clock,
        registry,
        probe: FakeProbe::default(),
        journal,
    }
}

/// Single-shot, in-process worker config with fast supervision polling
pub(crate) fn single_shot() -> WorkerConfig {
    WorkerConfig::default()
        .with_interval(Duration::ZERO)
        .with_isolation(Isolation::InProcess)
        .with_child_poll_interval(Duration::from_millis(5))
}

pub(crate) async fn worker(ctx: &TestContext, queues: &[&str], config: WorkerConfig) -> TestWorker {
    let queues = queues.iter().map(|q| q.to_string()).collect();
    Worker::new(ctx.client.clone(), ctx.probe.clone(), queues, config)
        .await
        .unwrap()
}
