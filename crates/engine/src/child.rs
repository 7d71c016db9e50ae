// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job side of a worker/job split
//!
//! Whether the job runs on a task inside the worker or in a re-executed
//! process, this is the code that performs it and records the outcome.

use crate::client::Client;
use crate::error::{EngineError, JobError};
use crate::event_bus::{Event, Hook, HookError};
use crate::job::{JobHandle, Performed};
use qw_adapters::Store;
use qw_core::{Clock, JobPayload, JobStatus, WorkerId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncRead, AsyncReadExt};

/// Environment variable marking a process as a job child
pub const CHILD_ENV: &str = "QW_CHILD";

/// What the worker writes to a child process's stdin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildRequest {
    pub queue: String,
    pub payload: JobPayload,
    pub worker: WorkerId,
}

impl ChildRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Read one request, to end of input
    pub async fn read_from<R: AsyncRead + Unpin>(mut reader: R) -> Result<Self, EngineError> {
        let mut raw = String::new();
        reader
            .read_to_string(&mut raw)
            .await
            .map_err(|e| EngineError::Isolation(format!("read child request: {e}")))?;
        Ok(serde_json::from_str(&raw)?)
    }
}

/// True when this process was started as a job child
pub fn is_child_process() -> bool {
    std::env::var(CHILD_ENV).is_ok_and(|v| v == "1")
}

/// Run one job in child mode. Panics are recorded as fatal failures.
pub async fn run_child<S: Store, C: Clock>(
    client: &Client<S, C>,
    request: ChildRequest,
) -> Result<(), EngineError> {
    let mut job = JobHandle::new(client.clone(), request.queue, request.payload);
    job.worker = Some(request.worker);
    let fallback = job.clone_unresolved();

    let task = tokio::spawn(execute(job, std::process::id()));
    if let Err(e) = task.await {
        let message = crate::isolation::join_error_message(e);
        tracing::error!(job = %fallback, error = %message, "job panicked");
        fallback.fail(&JobError::Fatal(message)).await;
    }
    Ok(())
}

/// Mark the job as executing, perform it and record the outcome
pub(crate) async fn execute<S: Store, C: Clock>(mut job: JobHandle<S, C>, pid: u32) {
    if let Some(id) = job.id() {
        if let Err(e) = job.client().pids().create(id, pid).await {
            tracing::warn!(job = %job, error = %e, "failed to write pid marker");
        }
    }

    let outcome = match job
        .client()
        .events()
        .trigger(Hook::AfterFork, &Event::Job(job.info()))
    {
        Ok(()) => job.perform().await,
        Err(HookError::DoNotPerform) => Ok(Performed::Vetoed),
        Err(e) => Err(JobError::Hook(e.to_string())),
    };

    match outcome {
        Ok(Performed::Completed(result)) => {
            tracing::info!(job = %job, "job completed");
            complete(&job, result).await;
        }
        Ok(Performed::Vetoed) => complete(&job, Value::Bool(false)).await,
        Err(e) => {
            tracing::error!(job = %job, error = %e, "job failed");
            job.fail(&e).await;
        }
    }

    if let Some(id) = job.id() {
        if let Err(e) = job.client().pids().del(id).await {
            tracing::warn!(job = %job, error = %e, "failed to clear pid marker");
        }
    }
}

async fn complete<S: Store, C: Clock>(job: &JobHandle<S, C>, result: Value) {
    if let Err(e) = job.update_status(JobStatus::Complete, Some(result)).await {
        tracing::warn!(job = %job, error = %e, "failed to mark job complete");
    }
}

#[cfg(test)]
#[path = "child_tests.rs"]
mod tests;
