// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake process probe for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{ProbeError, ProcessProbe};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::sync::Arc;

struct FakeProbeState {
    hostname: String,
    worker_pids: BTreeSet<u32>,
    alive: BTreeSet<u32>,
    fail_listing: bool,
}

/// In-memory process table
#[derive(Clone)]
pub struct FakeProbe {
    inner: Arc<Mutex<FakeProbeState>>,
}

impl Default for FakeProbe {
    fn default() -> Self {
        Self::new("testhost")
    }
}

impl FakeProbe {
    pub fn new(hostname: &str) -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeProbeState {
                hostname: hostname.to_string(),
                worker_pids: BTreeSet::new(),
                alive: BTreeSet::new(),
                fail_listing: false,
            })),
        }
    }

    /// Register a running worker process (also alive)
    pub fn add_worker(&self, pid: u32) {
        let mut state = self.inner.lock();
        state.worker_pids.insert(pid);
        state.alive.insert(pid);
    }

    /// Register a live non-worker process
    pub fn add_process(&self, pid: u32) {
        self.inner.lock().alive.insert(pid);
    }

    pub fn kill(&self, pid: u32) {
        let mut state = self.inner.lock();
        state.worker_pids.remove(&pid);
        state.alive.remove(&pid);
    }

    /// Make `worker_pids` fail
    pub fn fail_listing(&self, fail: bool) {
        self.inner.lock().fail_listing = fail;
    }
}

#[async_trait]
impl ProcessProbe for FakeProbe {
    async fn hostname(&self) -> Result<String, ProbeError> {
        Ok(self.inner.lock().hostname.clone())
    }

    async fn worker_pids(&self) -> Result<Vec<u32>, ProbeError> {
        let state = self.inner.lock();
        if state.fail_listing {
            return Err(ProbeError::CommandFailed("ps unavailable".to_string()));
        }
        Ok(state.worker_pids.iter().copied().collect())
    }

    async fn is_alive(&self, pid: u32) -> bool {
        self.inner.lock().alive.contains(&pid)
    }
}
