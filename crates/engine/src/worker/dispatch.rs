// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work loop and per-job bookkeeping

use super::{Worker, WorkerState, WorkingOn};
use crate::config::Isolation;
use crate::error::{EngineError, JobError};
use crate::event_bus::{Event, Hook, HookError};
use crate::isolation::{self, ExitOutcome};
use crate::job::JobHandle;
use qw_adapters::{ProcessProbe, Store};
use qw_core::{format_elapsed_ms, iso8601, keys, Clock, JobStatus};
use serde_json::Value;

impl<S, P, C> Worker<S, P, C>
where
    S: Store,
    P: ProcessProbe,
    C: Clock,
{
    /// Start up, process jobs until shut down, then unregister.
    ///
    /// With a zero interval the loop stops as soon as no job is found.
    pub async fn work(&mut self) -> Result<(), EngineError> {
        self.startup().await?;
        let interval = self.config.interval;
        tracing::info!(worker = %self.id, interval_ms = interval.as_millis() as u64, blocking = self.config.blocking, "worker started");

        loop {
            if self.control.is_shutdown() {
                break;
            }
            if self.control.take_kill_request() {
                tracing::debug!(worker = %self.id, "no running job to kill");
            }

            if !self.control.is_paused() {
                if let Err(e) = self.client.ping().await {
                    tracing::error!(worker = %self.id, error = %e, "store unreachable, retrying");
                    self.control.sleep(interval).await;
                    continue;
                }
            }

            let job = if self.control.is_paused() {
                None
            } else {
                match self.reserve().await {
                    Ok(job) => job,
                    Err(e) => {
                        if e.is_transient() {
                            tracing::warn!(worker = %self.id, error = %e, "reserve failed, retrying");
                        } else {
                            tracing::error!(worker = %self.id, error = %e, "reserve failed");
                        }
                        if interval.is_zero() {
                            break;
                        }
                        // A failed reserve returns at once, even in blocking mode
                        self.state = WorkerState::Idle;
                        self.control.sleep(interval).await;
                        continue;
                    }
                }
            };

            let Some(job) = job else {
                if interval.is_zero() {
                    break;
                }
                if !self.config.blocking || self.control.is_paused() {
                    self.state = WorkerState::Idle;
                    tracing::debug!(worker = %self.id, paused = self.control.is_paused(), "sleeping");
                    self.control.sleep(interval).await;
                }
                continue;
            };

            self.process(job).await;
        }

        self.state = WorkerState::ShuttingDown;
        self.unregister().await
    }

    /// Run one reserved job to completion and do the bookkeeping
    pub async fn process(&mut self, mut job: JobHandle<S, C>) {
        job.worker = Some(self.id.clone());
        tracing::info!(worker = %self.id, job = %job, "starting work");

        match self
            .client
            .events()
            .trigger(Hook::BeforeFork, &Event::Job(job.info()))
        {
            Ok(()) => {}
            Err(HookError::DoNotPerform) => {
                tracing::info!(worker = %self.id, job = %job, "job vetoed before start");
                if let Err(e) = job.update_status(JobStatus::Complete, Some(Value::Bool(false))).await {
                    tracing::warn!(job = %job, error = %e, "failed to update status");
                }
                self.done_working().await;
                return;
            }
            Err(e) => {
                tracing::error!(worker = %self.id, job = %job, error = %e, "beforeFork listener failed");
                job.fail(&JobError::Hook(e.to_string())).await;
                self.done_working().await;
                return;
            }
        }

        self.working_on(&job).await;
        let started_ms = self.client.clock().epoch_ms();

        let running = match isolation::launch(&self.config.isolation, job.clone_unresolved()).await {
            Ok(running) => Some(running),
            Err(e) if self.config.isolation != Isolation::InProcess => {
                tracing::warn!(worker = %self.id, error = %e, "could not start job process, running in-process");
                isolation::launch(&Isolation::InProcess, job.clone_unresolved())
                    .await
                    .ok()
            }
            Err(e) => {
                tracing::error!(worker = %self.id, error = %e, "could not start job");
                None
            }
        };

        let outcome = match running {
            Some(running) => self.supervise(running).await,
            None => ExitOutcome::Abnormal(None),
        };
        self.settle(&job, outcome).await;
        let elapsed_ms = self.client.clock().epoch_ms().saturating_sub(started_ms);
        tracing::info!(worker = %self.id, job = %job, elapsed = %format_elapsed_ms(elapsed_ms), "finished job");
        self.done_working().await;
    }

    /// Record the outcome seen from outside the job
    async fn settle(&self, job: &JobHandle<S, C>, outcome: ExitOutcome) {
        match outcome {
            ExitOutcome::Clean => match job.status().await {
                Ok(Some(status)) if status.is_pending() => {
                    if let Err(e) = job.update_status(JobStatus::Complete, None).await {
                        tracing::warn!(job = %job, error = %e, "failed to mark job complete");
                    }
                    tracing::info!(worker = %self.id, job = %job, "done");
                }
                Ok(_) => {}
                Err(e) => tracing::warn!(job = %job, error = %e, "failed to read job status"),
            },
            ExitOutcome::Code(code) => {
                job.fail(&JobError::DirtyExit(format!("Job exited with exit code {code}")))
                    .await;
            }
            ExitOutcome::Abnormal(signal) => {
                tracing::warn!(worker = %self.id, job = %job, signal = ?signal, "job exited abnormally");
                job.fail(&JobError::DirtyExit("Job exited abnormally".to_string()))
                    .await;
            }
            ExitOutcome::Panicked(message) => {
                tracing::error!(worker = %self.id, job = %job, error = %message, "job panicked");
                job.fail(&JobError::Fatal(message)).await;
            }
        }
    }

    /// Mark `job` running and record it as this worker's current job
    pub(crate) async fn working_on(&mut self, job: &JobHandle<S, C>) {
        self.state = WorkerState::Working;
        self.current_job = Some(job.clone_unresolved());

        if let Err(e) = job.update_status(JobStatus::Running, None).await {
            tracing::warn!(job = %job, error = %e, "failed to mark job running");
        }
        let record = WorkingOn {
            queue: job.queue.clone(),
            run_at: iso8601(self.client.clock().epoch_ms()),
            payload: job.payload.clone(),
        };
        let result = match serde_json::to_string(&record) {
            Ok(json) => self
                .client
                .store()
                .set(&keys::worker(&self.id), &json)
                .await
                .map_err(EngineError::from),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            tracing::warn!(worker = %self.id, error = %e, "failed to record current job");
        }
    }

    /// Clear the current job and count it as processed
    pub(crate) async fn done_working(&mut self) {
        self.current_job = None;
        self.state = WorkerState::Idle;

        let stats = self.client.stats();
        if let Err(e) = stats.incr("processed", 1).await {
            tracing::warn!(error = %e, "failed to count processed job");
        }
        let name = keys::worker_stat("processed", &self.id);
        if let Err(e) = stats.incr(&name, 1).await {
            tracing::warn!(error = %e, "failed to count processed job");
        }
        if let Err(e) = self.client.store().del(&keys::worker(&self.id)).await {
            tracing::warn!(worker = %self.id, error = %e, "failed to clear current job");
        }
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
