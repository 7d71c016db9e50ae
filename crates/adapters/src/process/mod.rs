// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Host process probes
//!
//! Workers need three facts about the host they run on: its name, which
//! worker processes are alive on it, and whether a given pid still exists.

mod ps;

pub use ps::PsProbe;

#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeProbe;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from process probes
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("process probe failed: {0}")]
    CommandFailed(String),
    #[error("unexpected probe output: {0}")]
    BadOutput(String),
}

/// Adapter for inspecting processes on the local host
#[async_trait]
pub trait ProcessProbe: Clone + Send + Sync + 'static {
    /// Name of this host, as used in worker identities
    async fn hostname(&self) -> Result<String, ProbeError>;

    /// Pids of worker processes currently running on this host
    async fn worker_pids(&self) -> Result<Vec<u32>, ProbeError>;

    /// Whether a process with this pid exists
    async fn is_alive(&self, pid: u32) -> bool;
}
