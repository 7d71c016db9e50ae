// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-job status records
//!
//! A job is tracked exactly when its status key exists. Terminal records
//! (failed, complete) expire a day after they are written; pending ones
//! stay until stopped.

use qw_adapters::{Store, StoreError};
use qw_core::{keys, Clock, JobId, JobStatus, StatusPacket, SystemClock, TERMINAL_STATUS_TTL_SECS};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Handle on one job's status record
pub struct Status<S, C: Clock = SystemClock> {
    store: S,
    clock: C,
    id: JobId,
    prefix: String,
    known_untracked: AtomicBool,
}

impl<S: Store, C: Clock> Status<S, C> {
    pub fn new(store: S, clock: C, id: JobId, prefix: impl Into<String>) -> Self {
        Self {
            store,
            clock,
            id,
            prefix: prefix.into(),
            known_untracked: AtomicBool::new(false),
        }
    }

    /// Start tracking: write a fresh WAITING record
    pub async fn create(
        store: S,
        clock: C,
        id: JobId,
        prefix: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let status = Self::new(store, clock, id, prefix);
        let packet = StatusPacket::new(JobStatus::Waiting, status.clock.epoch_secs());
        status.write(&packet).await?;
        Ok(status)
    }

    pub fn id(&self) -> &JobId {
        &self.id
    }

    pub fn key(&self) -> String {
        keys::job_status(&self.prefix, &self.id)
    }

    /// Whether the record exists. Once found missing, the answer is cached.
    pub async fn is_tracking(&self) -> Result<bool, StoreError> {
        if self.known_untracked.load(Ordering::Relaxed) {
            return Ok(false);
        }
        let tracking = self.store.exists(&self.key()).await?;
        if !tracking {
            self.known_untracked.store(true, Ordering::Relaxed);
        }
        Ok(tracking)
    }

    /// Overwrite status and result, keeping the original start time.
    ///
    /// No-op for untracked jobs.
    pub async fn update(&self, status: JobStatus, result: Option<Value>) -> Result<(), StoreError> {
        if !self.is_tracking().await? {
            return Ok(());
        }
        let started = self.fetch().await?.and_then(|p| p.started);
        let packet = StatusPacket {
            status: i64::from(status.code()),
            updated: Some(self.clock.epoch_secs()),
            started,
            result,
        };
        self.write(&packet).await?;

        if status.is_terminal() {
            self.store
                .expire(&self.key(), Duration::from_secs(TERMINAL_STATUS_TTL_SECS))
                .await?;
        }
        Ok(())
    }

    /// [`Status::update`] from a raw code; unknown codes are ignored.
    pub async fn update_code(&self, code: i64, result: Option<Value>) -> Result<(), StoreError> {
        match JobStatus::from_code(code) {
            Some(status) => self.update(status, result).await,
            None => {
                tracing::debug!(job = %self.id, code, "ignoring unknown status code");
                Ok(())
            }
        }
    }

    /// The whole record, or `None` when untracked or unreadable
    pub async fn fetch(&self) -> Result<Option<StatusPacket>, StoreError> {
        if !self.is_tracking().await? {
            return Ok(None);
        }
        let Some(raw) = self.store.get(&self.key()).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(packet) => Ok(Some(packet)),
            Err(e) => {
                tracing::warn!(key = %self.key(), error = %e, "unreadable status record");
                Ok(None)
            }
        }
    }

    pub async fn status(&self) -> Result<Option<JobStatus>, StoreError> {
        Ok(self.fetch().await?.and_then(|p| p.job_status()))
    }

    pub async fn started(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.fetch().await?.and_then(|p| p.started))
    }

    pub async fn updated(&self) -> Result<Option<i64>, StoreError> {
        Ok(self.fetch().await?.and_then(|p| p.updated))
    }

    pub async fn result(&self) -> Result<Option<Value>, StoreError> {
        Ok(self.fetch().await?.and_then(|p| p.result))
    }

    /// Stop tracking by deleting the record
    pub async fn stop(&self) -> Result<bool, StoreError> {
        self.store.del(&self.key()).await
    }

    async fn write(&self, packet: &StatusPacket) -> Result<(), StoreError> {
        let json = serde_json::to_string(packet)
            .map_err(|e| StoreError::Command(format!("encode status packet: {e}")))?;
        self.store.set(&self.key(), &json).await
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
