// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Failure capture
//!
//! Every failed job produces one [`Failure`] handed to the configured sink.
//! The default sink appends JSON records to the `failed` list.

use crate::error::{EngineError, FailureKind, JobError};
use async_trait::async_trait;
use qw_adapters::Store;
use qw_core::{keys, JobPayload};
use serde::{Deserialize, Serialize};

/// One recorded failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// ISO-8601 time of failure
    pub failed_at: String,
    pub payload: JobPayload,
    pub kind: FailureKind,
    /// Error class (`Exception`, `Fatal`, `DirtyExit`, ...)
    pub exception: String,
    pub error: String,
    pub worker: String,
    pub queue: String,
}

impl Failure {
    pub fn new(
        failed_at: String,
        payload: &JobPayload,
        error: &JobError,
        worker: &str,
        queue: &str,
    ) -> Self {
        Self {
            failed_at,
            payload: payload.clone(),
            kind: error.kind(),
            exception: error.name().to_string(),
            error: error.to_string(),
            worker: worker.to_string(),
            queue: queue.to_string(),
        }
    }
}

/// Destination for failure records
#[async_trait]
pub trait FailureSink: Send + Sync {
    async fn record(&self, failure: &Failure) -> Result<(), EngineError>;
}

/// Appends failures to the `failed` list in the store
#[derive(Clone)]
pub struct StoreFailureSink<S> {
    store: S,
}

impl<S: Store> StoreFailureSink<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<S: Store> FailureSink for StoreFailureSink<S> {
    async fn record(&self, failure: &Failure) -> Result<(), EngineError> {
        let json = serde_json::to_string(failure)?;
        self.store.rpush(keys::FAILED, &json).await?;
        Ok(())
    }
}

/// Writes failures to the log only
#[derive(Clone, Copy, Debug, Default)]
pub struct LogFailureSink;

#[async_trait]
impl FailureSink for LogFailureSink {
    async fn record(&self, failure: &Failure) -> Result<(), EngineError> {
        tracing::error!(
            worker = %failure.worker,
            queue = %failure.queue,
            class = %failure.payload.class,
            kind = ?failure.kind,
            error = %failure.error,
            "job failed"
        );
        Ok(())
    }
}

/// Reads back what [`StoreFailureSink`] wrote
#[derive(Clone)]
pub struct Failures<S> {
    store: S,
}

impl<S: Store> Failures<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn count(&self) -> Result<u64, EngineError> {
        Ok(self.store.llen(keys::FAILED).await?)
    }

    /// Records in `start..=stop` (negative indexes count from the end).
    /// Entries that no longer parse are skipped.
    pub async fn range(&self, start: i64, stop: i64) -> Result<Vec<Failure>, EngineError> {
        let raw = self.store.lrange(keys::FAILED, start, stop).await?;
        Ok(raw
            .iter()
            .filter_map(|entry| match serde_json::from_str(entry) {
                Ok(failure) => Some(failure),
                Err(e) => {
                    tracing::warn!(error = %e, "skipping unreadable failure record");
                    None
                }
            })
            .collect())
    }

    pub async fn all(&self) -> Result<Vec<Failure>, EngineError> {
        self.range(0, -1).await
    }

    pub async fn clear(&self) -> Result<bool, EngineError> {
        Ok(self.store.del(keys::FAILED).await?)
    }
}

#[cfg(test)]
#[path = "failure_tests.rs"]
mod tests;
