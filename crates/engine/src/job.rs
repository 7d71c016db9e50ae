// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job handle: one reserved (or about to be created) unit of work

use crate::client::Client;
use crate::error::{EngineError, JobError};
use crate::event_bus::{Event, Hook, HookError, JobRef};
use crate::factory::{Perform, PerformError};
use crate::failure::Failure;
use qw_adapters::{Store, StoreError};
use qw_core::{epoch_float, iso8601, Clock, JobId, JobPayload, JobStatus, SystemClock, WorkerId};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// Parameters for [`JobHandle::create`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewJob {
    pub queue: String,
    pub class: String,
    /// Must be an array or null
    pub args: Value,
    pub monitor: bool,
    pub id: Option<JobId>,
    pub prefix: String,
}

impl NewJob {
    pub fn new(queue: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            queue: queue.into(),
            class: class.into(),
            args: Value::Null,
            monitor: false,
            id: None,
            prefix: String::new(),
        }
    }

    pub fn with_args(mut self, args: Value) -> Self {
        self.args = args;
        self
    }

    /// Track the job's status from creation
    pub fn monitored(mut self) -> Self {
        self.monitor = true;
        self
    }

    pub fn with_id(mut self, id: impl Into<JobId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }
}

/// Outcome of [`JobHandle::perform`] when nothing went wrong
#[derive(Debug, Clone, PartialEq)]
pub enum Performed {
    Completed(Value),
    /// A listener or the job itself declined to run
    Vetoed,
}

pub(crate) fn args_list(args: Value) -> Result<Vec<Value>, EngineError> {
    match args {
        Value::Null => Ok(Vec::new()),
        Value::Array(list) => Ok(list),
        other => Err(EngineError::InvalidArgs(format!(
            "args must be an array, got {other}"
        ))),
    }
}

pub struct JobHandle<S, C: Clock = SystemClock> {
    client: Client<S, C>,
    pub queue: String,
    pub payload: JobPayload,
    /// Worker executing the job, once reserved by one
    pub worker: Option<WorkerId>,
    instance: Option<Box<dyn Perform>>,
}

impl<S: Store, C: Clock> JobHandle<S, C> {
    pub fn new(client: Client<S, C>, queue: impl Into<String>, payload: JobPayload) -> Self {
        Self {
            client,
            queue: queue.into(),
            payload,
            worker: None,
            instance: None,
        }
    }

    /// Validate, announce and push a new job. Returns `None` when a
    /// `beforeEnqueue` listener vetoed it; nothing is pushed in that case.
    pub async fn create(client: &Client<S, C>, job: NewJob) -> Result<Option<JobId>, EngineError> {
        let args = args_list(job.args)?;
        let id = job.id.unwrap_or_else(|| client.generate_job_id());

        let event = Event::Enqueue {
            queue: &job.queue,
            class: &job.class,
            args: &args,
            id: &id,
        };
        match client.events().trigger(Hook::BeforeEnqueue, &event) {
            Ok(()) => {}
            Err(HookError::DoNotCreate) => {
                tracing::info!(queue = %job.queue, class = %job.class, job_id = %id, "enqueue vetoed");
                return Ok(None);
            }
            Err(e) => return Err(EngineError::Listener(e.to_string())),
        }

        let payload = JobPayload {
            class: job.class.clone(),
            args: args.clone(),
            id: Some(id.clone()),
            prefix: job.prefix.clone(),
            queue_time: Some(epoch_float(client.clock().epoch_ms())),
        };
        client.push(&job.queue, &payload).await?;

        if job.monitor {
            crate::status::Status::create(
                client.store().clone(),
                client.clock().clone(),
                id.clone(),
                job.prefix.as_str(),
            )
            .await?;
        }

        let event = Event::Enqueue {
            queue: &job.queue,
            class: &job.class,
            args: &args,
            id: &id,
        };
        client
            .events()
            .trigger(Hook::AfterEnqueue, &event)
            .map_err(|e| EngineError::Listener(e.to_string()))?;

        tracing::debug!(queue = %job.queue, class = %job.class, job_id = %id, "enqueued");
        Ok(Some(id))
    }

    /// Pop one job from `queue` without waiting
    pub async fn reserve(client: &Client<S, C>, queue: &str) -> Result<Option<Self>, EngineError> {
        Ok(client
            .pop(queue)
            .await?
            .map(|payload| Self::new(client.clone(), queue, payload)))
    }

    /// Pop from the first of `queues` with data, waiting up to `timeout`
    pub async fn reserve_blocking(
        client: &Client<S, C>,
        queues: &[String],
        timeout: Duration,
    ) -> Result<Option<Self>, EngineError> {
        Ok(client
            .blpop(queues, timeout)
            .await?
            .map(|(queue, payload)| Self::new(client.clone(), queue, payload)))
    }

    pub fn client(&self) -> &Client<S, C> {
        &self.client
    }

    pub fn id(&self) -> Option<&JobId> {
        self.payload.id.as_ref()
    }

    pub fn args(&self) -> &[Value] {
        &self.payload.args
    }

    pub fn prefix(&self) -> &str {
        &self.payload.prefix
    }

    pub fn info(&self) -> JobRef<'_> {
        JobRef {
            queue: &self.queue,
            payload: &self.payload,
            worker: self.worker.as_ref(),
        }
    }

    /// Same job, without the resolved instance
    pub fn clone_unresolved(&self) -> Self {
        Self {
            client: self.client.clone(),
            queue: self.queue.clone(),
            payload: self.payload.clone(),
            worker: self.worker.clone(),
            instance: None,
        }
    }

    /// Update the tracked status; no-op without an id or tracking record
    pub async fn update_status(
        &self,
        status: JobStatus,
        result: Option<Value>,
    ) -> Result<(), StoreError> {
        match self.id() {
            Some(id) => self.client.status(id, self.prefix()).update(status, result).await,
            None => Ok(()),
        }
    }

    /// Tracked status, or `None` when untracked
    pub async fn status(&self) -> Result<Option<JobStatus>, StoreError> {
        match self.id() {
            Some(id) => self.client.status(id, self.prefix()).status().await,
            None => Ok(None),
        }
    }

    /// Resolve the executable instance once per handle
    fn instance(&mut self) -> Result<&mut dyn Perform, JobError> {
        let instance = match self.instance.take() {
            Some(instance) => instance,
            None => self
                .client
                .factory()
                .create(&self.payload.class, &self.payload.args, &self.queue)?,
        };
        Ok(self.instance.insert(instance).as_mut())
    }

    /// Run the job: `beforePerform`, set up, perform, tear down,
    /// `afterPerform`. A veto from `beforePerform` or `set_up` skips the rest.
    pub async fn perform(&mut self) -> Result<Performed, JobError> {
        match self
            .client
            .events()
            .trigger(Hook::BeforePerform, &Event::Job(self.info()))
        {
            Ok(()) => {}
            Err(HookError::DoNotPerform) => {
                tracing::info!(job = %self, "perform vetoed");
                return Ok(Performed::Vetoed);
            }
            Err(e) => return Err(JobError::Hook(e.to_string())),
        }

        let instance = self.instance()?;
        let result = match run_instance(instance).await? {
            Some(value) => value,
            None => {
                tracing::info!(job = %self, "job declined to perform");
                return Ok(Performed::Vetoed);
            }
        };

        self.client
            .events()
            .trigger(Hook::AfterPerform, &Event::Job(self.info()))
            .map_err(|e| JobError::Hook(e.to_string()))?;

        Ok(Performed::Completed(result))
    }

    /// Record a failure. Never errors: problems along the way are logged.
    pub async fn fail(&self, error: &JobError) {
        let worker = self.worker.as_ref().map(WorkerId::as_str).unwrap_or_default();

        let event = Event::Failure {
            job: self.info(),
            error,
        };
        if let Err(e) = self.client.events().trigger(Hook::OnFailure, &event) {
            tracing::warn!(job = %self, error = %e, "onFailure listener failed");
        }

        if let Err(e) = self.update_status(JobStatus::Failed, None).await {
            tracing::warn!(job = %self, error = %e, "failed to mark job failed");
        }

        let failure = Failure::new(
            iso8601(self.client.clock().epoch_ms()),
            &self.payload,
            error,
            worker,
            &self.queue,
        );
        if let Err(e) = self.client.failure_sink().record(&failure).await {
            tracing::error!(job = %self, error = %e, "failed to record failure");
        }

        if let Some(id) = self.id() {
            if let Err(e) = self.client.pids().del(id).await {
                tracing::warn!(job = %self, error = %e, "failed to clear pid marker");
            }
        }

        let stats = self.client.stats();
        if let Err(e) = stats.incr("failed", 1).await {
            tracing::warn!(error = %e, "failed to count failure");
        }
        if let Some(worker) = &self.worker {
            let name = qw_core::keys::worker_stat("failed", worker);
            if let Err(e) = stats.incr(&name, 1).await {
                tracing::warn!(error = %e, "failed to count worker failure");
            }
        }
    }

    /// Enqueue an identical job under a new id, tracked if this one is
    pub async fn recreate(&self) -> Result<Option<JobId>, EngineError> {
        let monitor = match self.id() {
            Some(id) => self.client.status(id, self.prefix()).is_tracking().await?,
            None => false,
        };
        let mut job = NewJob::new(self.queue.as_str(), self.payload.class.as_str())
            .with_args(Value::Array(self.payload.args.clone()))
            .with_prefix(self.prefix());
        job.monitor = monitor;
        Self::create(&self.client, job).await
    }
}

/// Set up, perform and tear down. `None` means the job declined.
async fn run_instance(instance: &mut dyn Perform) -> Result<Option<Value>, JobError> {
    let outcome = async {
        instance.set_up().await?;
        let value = instance.perform().await?;
        instance.tear_down().await?;
        Ok::<Value, PerformError>(value)
    }
    .await;
    match outcome {
        Ok(value) => Ok(Some(value)),
        Err(PerformError::DoNotPerform) => Ok(None),
        Err(PerformError::Failed(message)) => Err(JobError::Exception(message)),
    }
}

impl<S, C: Clock> fmt::Display for JobHandle<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(Job{{{}}}", self.queue)?;
        if let Some(id) = &self.payload.id {
            write!(f, " | ID: {}", id)?;
        }
        write!(f, " | {}", self.payload.class)?;
        if !self.payload.args.is_empty() {
            let wrapped = Value::Array(vec![Value::Array(self.payload.args.clone())]);
            write!(f, " | {}", wrapped)?;
        }
        f.write_str(")")
    }
}

impl<S, C: Clock> fmt::Debug for JobHandle<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobHandle")
            .field("queue", &self.queue)
            .field("payload", &self.payload)
            .field("worker", &self.worker)
            .finish()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
