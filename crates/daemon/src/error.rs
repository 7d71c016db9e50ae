// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use qw_adapters::{ProbeError, StoreError};
use qw_engine::EngineError;
use thiserror::Error;

/// Errors from daemon startup and process plumbing
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("store unavailable: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("logging setup failed: {0}")]
    Logging(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
