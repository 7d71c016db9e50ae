// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registration, deregistration and dead-worker pruning

use super::{Worker, WorkerState};
use crate::error::{EngineError, JobError};
use crate::event_bus::{Event, Hook};
use qw_adapters::{ProcessProbe, Store};
use qw_core::{iso8601, keys, Clock, WorkerId};

impl<S, P, C> Worker<S, P, C>
where
    S: Store,
    P: ProcessProbe,
    C: Clock,
{
    /// Prune dead peers, announce the first fork, register
    pub async fn startup(&mut self) -> Result<(), EngineError> {
        self.state = WorkerState::Starting;
        if let Err(e) = self.prune_dead_workers().await {
            tracing::warn!(worker = %self.id, error = %e, "dead worker pruning failed");
        }
        self.client
            .events()
            .trigger(Hook::BeforeFirstFork, &Event::Worker(&self.id))
            .map_err(|e| EngineError::Listener(e.to_string()))?;
        self.register().await?;
        self.state = WorkerState::Idle;
        Ok(())
    }

    /// Add this worker to the registry with its start time
    pub async fn register(&self) -> Result<(), EngineError> {
        let store = self.client.store();
        store.sadd(keys::WORKERS, self.id.as_str()).await?;
        let started = iso8601(self.client.clock().epoch_ms());
        store.set(&keys::worker_started(&self.id), &started).await?;
        tracing::info!(worker = %self.id, "registered worker");
        Ok(())
    }

    /// Remove this worker from the registry. A job still marked as in
    /// progress is failed first.
    pub async fn unregister(&mut self) -> Result<(), EngineError> {
        if let Some(job) = self.current_job.take() {
            tracing::warn!(worker = %self.id, job = %job, "failing job left in progress");
            job.fail(&JobError::DirtyExit(
                "worker stopped before the job finished".to_string(),
            ))
            .await;
        }

        let store = self.client.store();
        store.srem(keys::WORKERS, self.id.as_str()).await?;
        store.del(&keys::worker(&self.id)).await?;
        store.del(&keys::worker_started(&self.id)).await?;
        let stats = self.client.stats();
        stats.clear(&keys::worker_stat("processed", &self.id)).await?;
        stats.clear(&keys::worker_stat("failed", &self.id)).await?;

        self.state = WorkerState::Terminated;
        tracing::info!(worker = %self.id, "unregistered worker");
        Ok(())
    }

    /// Unregister workers on this host whose process is gone. Returns the
    /// pruned ids.
    pub async fn prune_dead_workers(&self) -> Result<Vec<WorkerId>, EngineError> {
        let running = self.probe.worker_pids().await?;
        let mut pruned = Vec::new();

        for id in Self::all(&self.client).await? {
            let Some(parts) = id.parts() else {
                continue;
            };
            if parts.hostname != self.hostname {
                continue;
            }
            let Some(pid) = parts.pid_number() else {
                continue;
            };
            if pid == self.pid || running.contains(&pid) {
                continue;
            }

            tracing::info!(worker = %id, "pruning dead worker");
            if let Some(mut dead) = Self::find(&self.client, self.probe.clone(), &id).await? {
                dead.unregister().await?;
                pruned.push(id);
            }
        }
        Ok(pruned)
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
