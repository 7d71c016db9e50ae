// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue facade shared by producers, workers and the delayed scheduler
//!
//! A `Client` bundles the process-scoped collaborators (store, clock, event
//! bus, failure sink, job factory, id generator). Clones share all of them.

use crate::error::EngineError;
use crate::event_bus::EventBus;
use crate::factory::{JobFactory, Registry};
use crate::failure::{FailureSink, Failures, StoreFailureSink};
use crate::job::{JobHandle, NewJob};
use crate::pid::JobPid;
use crate::stat::Stat;
use crate::status::Status;
use qw_adapters::{Store, StoreError};
use qw_core::{keys, Clock, IdGen, JobId, JobPayload, SystemClock, UuidIdGen};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct Client<S, C: Clock = SystemClock> {
    store: S,
    clock: C,
    events: EventBus,
    failures: Arc<dyn FailureSink>,
    factory: Arc<dyn JobFactory>,
    ids: Arc<dyn IdGen>,
}

impl<S: Store> Client<S, SystemClock> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: Store, C: Clock> Client<S, C> {
    /// Client with the default collaborators: failures go to the store,
    /// no job classes registered, random job ids.
    pub fn with_clock(store: S, clock: C) -> Self {
        Self {
            failures: Arc::new(StoreFailureSink::new(store.clone())),
            store,
            clock,
            events: EventBus::new(),
            factory: Arc::new(Registry::new()),
            ids: Arc::new(UuidIdGen),
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = events;
        self
    }

    pub fn with_failure_sink(mut self, sink: impl FailureSink + 'static) -> Self {
        self.failures = Arc::new(sink);
        self
    }

    pub fn with_factory(mut self, factory: impl JobFactory + 'static) -> Self {
        self.factory = Arc::new(factory);
        self
    }

    pub fn with_id_gen(mut self, ids: impl IdGen + 'static) -> Self {
        self.ids = Arc::new(ids);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn failure_sink(&self) -> &dyn FailureSink {
        self.failures.as_ref()
    }

    pub fn factory(&self) -> &dyn JobFactory {
        self.factory.as_ref()
    }

    pub fn stats(&self) -> Stat<S> {
        Stat::new(self.store.clone())
    }

    pub fn pids(&self) -> JobPid<S> {
        JobPid::new(self.store.clone())
    }

    /// Reader for the default failure list
    pub fn failures(&self) -> Failures<S> {
        Failures::new(self.store.clone())
    }

    pub fn status(&self, id: &JobId, prefix: &str) -> Status<S, C> {
        Status::new(self.store.clone(), self.clock.clone(), id.clone(), prefix)
    }

    pub fn generate_job_id(&self) -> JobId {
        JobId::new(self.ids.next())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }

    /// Append a payload to `queue`, registering the queue name
    pub async fn push(&self, queue: &str, payload: &JobPayload) -> Result<u64, EngineError> {
        let json = payload.to_json()?;
        self.store.sadd(keys::QUEUES, queue).await?;
        Ok(self.store.rpush(&keys::queue(queue), &json).await?)
    }

    /// Pop the head of `queue`
    pub async fn pop(&self, queue: &str) -> Result<Option<JobPayload>, EngineError> {
        match self.store.lpop(&keys::queue(queue)).await? {
            Some(json) => Ok(Some(JobPayload::from_json(&json)?)),
            None => Ok(None),
        }
    }

    /// Pop from the first of `queues` with data, waiting up to `timeout`.
    /// Returns the queue name with the payload.
    pub async fn blpop(
        &self,
        queues: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, JobPayload)>, EngineError> {
        let list_keys: Vec<String> = queues.iter().map(|q| keys::queue(q)).collect();
        let Some((key, json)) = self.store.blpop(&list_keys, timeout).await? else {
            return Ok(None);
        };
        let queue = keys::queue_name(&key).unwrap_or(&key).to_string();
        Ok(Some((queue, JobPayload::from_json(&json)?)))
    }

    /// Number of pending payloads in `queue`
    pub async fn size(&self, queue: &str) -> Result<u64, EngineError> {
        Ok(self.store.llen(&keys::queue(queue)).await?)
    }

    /// Known queue names, sorted
    pub async fn queues(&self) -> Result<Vec<String>, EngineError> {
        let mut queues = self.store.smembers(keys::QUEUES).await?;
        queues.sort();
        Ok(queues)
    }

    /// Drop a queue and its pending payloads. Returns how many were dropped.
    pub async fn remove_queue(&self, queue: &str) -> Result<u64, EngineError> {
        let pending = self.size(queue).await?;
        self.store.del(&keys::queue(queue)).await?;
        self.store.srem(keys::QUEUES, queue).await?;
        Ok(pending)
    }

    /// Enqueue a job. Returns `None` when a listener vetoed it.
    pub async fn enqueue(
        &self,
        queue: &str,
        class: &str,
        args: Value,
        monitor: bool,
    ) -> Result<Option<JobId>, EngineError> {
        let mut job = NewJob::new(queue, class).with_args(args);
        if monitor {
            job = job.monitored();
        }
        JobHandle::create(self, job).await
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
