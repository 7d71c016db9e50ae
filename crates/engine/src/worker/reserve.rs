// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Picking the next job

use super::Worker;
use crate::error::EngineError;
use crate::job::JobHandle;
use qw_adapters::{ProcessProbe, Store};
use qw_core::Clock;

impl<S, P, C> Worker<S, P, C>
where
    S: Store,
    P: ProcessProbe,
    C: Clock,
{
    /// Reserve the next job, honouring queue order. Unreadable payloads
    /// are logged and dropped.
    pub async fn reserve(&self) -> Result<Option<JobHandle<S, C>>, EngineError> {
        if !self.has_parent().await {
            return Ok(None);
        }

        let queues = self.queues(true).await?;
        if self.config.blocking {
            if queues.is_empty() {
                self.control.sleep(self.config.interval).await;
                return Ok(None);
            }
            tracing::debug!(worker = %self.id, timeout_ms = self.config.interval.as_millis() as u64, "blocking reserve");
            return match JobHandle::reserve_blocking(&self.client, &queues, self.config.interval).await {
                Ok(Some(job)) => {
                    tracing::info!(worker = %self.id, queue = %job.queue, "found job");
                    Ok(Some(job))
                }
                Ok(None) => Ok(None),
                Err(EngineError::Malformed(e)) => {
                    tracing::warn!(worker = %self.id, error = %e, "dropping unreadable payload");
                    Ok(None)
                }
                Err(e) => Err(e),
            };
        }

        for queue in &queues {
            tracing::debug!(worker = %self.id, queue = %queue, "checking queue");
            match JobHandle::reserve(&self.client, queue).await {
                Ok(Some(job)) => {
                    tracing::info!(worker = %self.id, queue = %queue, "found job");
                    return Ok(Some(job));
                }
                Ok(None) => {}
                Err(EngineError::Malformed(e)) => {
                    tracing::warn!(worker = %self.id, queue = %queue, error = %e, "dropping unreadable payload");
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// With `has_parent` set, shut down once the parent process is gone
    async fn has_parent(&self) -> bool {
        if !self.config.has_parent {
            return true;
        }
        if self.probe.is_alive(self.parent_pid).await {
            return true;
        }
        tracing::info!(worker = %self.id, parent = self.parent_pid, "parent process is gone, shutting down");
        self.control.shutdown();
        false
    }
}

#[cfg(test)]
#[path = "reserve_tests.rs"]
mod tests;
