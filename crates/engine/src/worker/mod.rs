// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker runtime
//!
//! One `Worker` runs one reservation loop. Each reserved job runs under the
//! configured [`Isolation`](crate::config::Isolation) while the worker
//! supervises it and keeps the registry, stats and status records current.

mod dispatch;
mod lifecycle;
mod reserve;
mod supervise;

use crate::client::Client;
use crate::config::WorkerConfig;
use crate::control::Control;
use crate::error::EngineError;
use crate::job::JobHandle;
use qw_adapters::{ProcessProbe, Store};
use qw_core::{keys, Clock, JobPayload, SystemClock, WorkerId};
use serde::{Deserialize, Serialize};

/// Where a worker is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Starting,
    Idle,
    Working,
    ShuttingDown,
    Terminated,
}

/// The `worker:<id>` record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkingOn {
    pub queue: String,
    /// ISO-8601 time the job started
    pub run_at: String,
    pub payload: JobPayload,
}

pub struct Worker<S, P, C: Clock = SystemClock> {
    client: Client<S, C>,
    probe: P,
    id: WorkerId,
    hostname: String,
    pid: u32,
    parent_pid: u32,
    queues: Vec<String>,
    config: WorkerConfig,
    control: Control,
    current_job: Option<JobHandle<S, C>>,
    child_pid: Option<u32>,
    state: WorkerState,
}

impl<S: Store, P: ProcessProbe, C: Clock> Worker<S, P, C> {
    /// Worker for this process. `queues` are in priority order; `*` means
    /// every known queue.
    pub async fn new(
        client: Client<S, C>,
        probe: P,
        queues: Vec<String>,
        config: WorkerConfig,
    ) -> Result<Self, EngineError> {
        let hostname = probe.hostname().await?;
        let pid = std::process::id();
        Ok(Self::assemble(client, probe, hostname, pid, queues, config))
    }

    fn assemble(
        client: Client<S, C>,
        probe: P,
        hostname: String,
        pid: u32,
        queues: Vec<String>,
        config: WorkerConfig,
    ) -> Self {
        Self {
            id: WorkerId::compose(&hostname, pid, &queues),
            client,
            probe,
            hostname,
            pid,
            parent_pid: std::os::unix::process::parent_id(),
            queues,
            config,
            control: Control::new(),
            current_job: None,
            child_pid: None,
            state: WorkerState::Starting,
        }
    }

    /// Registered worker ids, sorted
    pub async fn all(client: &Client<S, C>) -> Result<Vec<WorkerId>, EngineError> {
        let mut ids: Vec<WorkerId> = client
            .store()
            .smembers(keys::WORKERS)
            .await?
            .into_iter()
            .map(WorkerId::new)
            .collect();
        ids.sort();
        Ok(ids)
    }

    pub async fn exists(client: &Client<S, C>, id: &WorkerId) -> Result<bool, EngineError> {
        Ok(client.store().sismember(keys::WORKERS, id.as_str()).await?)
    }

    /// Rebuild a registered worker from its id. The job it was working on,
    /// if any, is restored as its current job.
    pub async fn find(
        client: &Client<S, C>,
        probe: P,
        id: &WorkerId,
    ) -> Result<Option<Self>, EngineError> {
        if !Self::exists(client, id).await? {
            return Ok(None);
        }
        let Some(parts) = id.parts() else {
            tracing::warn!(worker = %id, "registered worker id does not parse");
            return Ok(None);
        };
        let queues = parts.queues.iter().map(|q| q.to_string()).collect();
        let mut worker = Self::assemble(
            client.clone(),
            probe,
            parts.hostname.to_string(),
            parts.pid_number().unwrap_or(0),
            queues,
            WorkerConfig::default(),
        );
        worker.set_id(id.clone());
        if let Some(working) = worker.job().await? {
            let mut job = JobHandle::new(client.clone(), working.queue, working.payload);
            job.worker = Some(id.clone());
            worker.current_job = Some(job);
        }
        Ok(Some(worker))
    }

    pub fn id(&self) -> &WorkerId {
        &self.id
    }

    pub fn set_id(&mut self, id: WorkerId) {
        self.id = id;
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    pub fn client(&self) -> &Client<S, C> {
        &self.client
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Handle for pausing, resuming or stopping this worker
    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.control = control;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    /// Pid of the process running the current job
    pub fn child_pid(&self) -> Option<u32> {
        self.child_pid
    }

    pub fn current_job(&self) -> Option<&JobHandle<S, C>> {
        self.current_job.as_ref()
    }

    /// Queues to check, in order. With `fetch`, a `*` entry expands to every
    /// known queue, sorted.
    pub async fn queues(&self, fetch: bool) -> Result<Vec<String>, EngineError> {
        if !fetch || !self.queues.iter().any(|q| q == "*") {
            return Ok(self.queues.clone());
        }
        self.client.queues().await
    }

    /// What this worker is processing, if anything
    pub async fn job(&self) -> Result<Option<WorkingOn>, EngineError> {
        match self.client.store().get(&keys::worker(&self.id)).await? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Per-worker counter, e.g. `processed` or `failed`
    pub async fn stat(&self, name: &str) -> Result<i64, EngineError> {
        let name = keys::worker_stat(name, &self.id);
        Ok(self.client.stats().get(&name).await?)
    }
}

impl<S, P, C: Clock> std::fmt::Display for Worker<S, P, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id.as_str())
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
