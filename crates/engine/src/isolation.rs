// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launching and watching a job away from the worker loop

use crate::child::{ChildRequest, CHILD_ENV};
use crate::config::Isolation;
use crate::error::EngineError;
use crate::job::JobHandle;
use qw_adapters::Store;
use qw_core::{Clock, WorkerId};
use std::os::unix::process::ExitStatusExt;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::task::{JoinError, JoinHandle};

/// How a job run ended, as seen from the worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitOutcome {
    Clean,
    /// Exited with a non-zero code
    Code(i32),
    /// Killed by a signal, or aborted on request
    Abnormal(Option<i32>),
    /// In-process job panicked
    Panicked(String),
}

/// A job in flight
#[derive(Debug)]
pub enum RunningJob {
    Task(JoinHandle<()>),
    Process(tokio::process::Child),
}

impl RunningJob {
    /// OS pid of the process running the job
    pub fn pid(&self) -> Option<u32> {
        match self {
            RunningJob::Task(_) => Some(std::process::id()),
            RunningJob::Process(child) => child.id(),
        }
    }

    /// Non-blocking check for completion. Reports the outcome once; do not
    /// call again after it returned `Some`.
    pub async fn try_wait(&mut self) -> Result<Option<ExitOutcome>, EngineError> {
        match self {
            RunningJob::Task(handle) => {
                if !handle.is_finished() {
                    return Ok(None);
                }
                Ok(Some(match handle.await {
                    Ok(()) => ExitOutcome::Clean,
                    Err(e) if e.is_panic() => ExitOutcome::Panicked(join_error_message(e)),
                    Err(_) => ExitOutcome::Abnormal(None),
                }))
            }
            RunningJob::Process(child) => {
                let status = child
                    .try_wait()
                    .map_err(|e| EngineError::Isolation(format!("wait for job process: {e}")))?;
                Ok(status.map(|status| {
                    if status.success() {
                        ExitOutcome::Clean
                    } else if let Some(code) = status.code() {
                        ExitOutcome::Code(code)
                    } else {
                        ExitOutcome::Abnormal(status.signal())
                    }
                }))
            }
        }
    }

    /// Forcefully stop the job. Completion is still observed via `try_wait`.
    pub fn kill(&mut self) -> Result<(), EngineError> {
        match self {
            RunningJob::Task(handle) => {
                handle.abort();
                Ok(())
            }
            RunningJob::Process(child) => child
                .start_kill()
                .map_err(|e| EngineError::Isolation(format!("kill job process: {e}"))),
        }
    }
}

/// Start `job` under `isolation`
pub async fn launch<S: Store, C: Clock>(
    isolation: &Isolation,
    job: JobHandle<S, C>,
) -> Result<RunningJob, EngineError> {
    match isolation {
        Isolation::InProcess => Ok(RunningJob::Task(tokio::spawn(crate::child::execute(
            job,
            std::process::id(),
        )))),
        Isolation::Subprocess { program, args } => {
            let worker = job
                .worker
                .clone()
                .unwrap_or_else(|| WorkerId::new(String::new()));
            let request = ChildRequest {
                queue: job.queue.clone(),
                payload: job.payload.clone(),
                worker,
            };
            let json = request.to_json()?;

            let mut child = Command::new(program)
                .args(args)
                .env(CHILD_ENV, "1")
                .stdin(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| {
                    EngineError::Isolation(format!("spawn {}: {e}", program.display()))
                })?;

            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(json.as_bytes())
                    .await
                    .map_err(|e| EngineError::Isolation(format!("write child request: {e}")))?;
                // Dropping closes the pipe so the child sees end of input
                drop(stdin);
            }
            tracing::debug!(pid = ?child.id(), program = %program.display(), "job process started");
            Ok(RunningJob::Process(child))
        }
    }
}

/// Panic payload as text, or a description of the cancellation
pub(crate) fn join_error_message(error: JoinError) -> String {
    if !error.is_panic() {
        return error.to_string();
    }
    let payload = error.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
#[path = "isolation_tests.rs"]
mod tests;
