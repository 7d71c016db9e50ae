// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Markers recording which process is executing a job

use qw_adapters::{Store, StoreError};
use qw_core::{keys, JobId};

/// Reads and writes `job:<id>:pid`
#[derive(Clone)]
pub struct JobPid<S> {
    store: S,
}

impl<S: Store> JobPid<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn create(&self, id: &JobId, pid: u32) -> Result<(), StoreError> {
        self.store.set(&keys::job_pid(id), &pid.to_string()).await
    }

    /// Pid executing the job, or 0 when none is recorded
    pub async fn get(&self, id: &JobId) -> Result<u32, StoreError> {
        let value = self.store.get(&keys::job_pid(id)).await?;
        Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    pub async fn del(&self, id: &JobId) -> Result<bool, StoreError> {
        self.store.del(&keys::job_pid(id)).await
    }
}

#[cfg(test)]
#[path = "pid_tests.rs"]
mod tests;
