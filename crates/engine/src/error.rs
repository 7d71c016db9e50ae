// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the engine

use crate::factory::FactoryError;
use qw_adapters::{ProbeError, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of engine operations
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("malformed record: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("listener failed: {0}")]
    Listener(String),
    #[error(transparent)]
    Probe(#[from] ProbeError),
    #[error("isolation failed: {0}")]
    Isolation(String),
}

impl EngineError {
    /// Infrastructure outage; retried rather than escalated
    pub fn is_transient(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_transient())
    }
}

/// Why a job did not complete
#[derive(Debug, Clone, Error)]
pub enum JobError {
    /// The job's own code returned an error
    #[error("{0}")]
    Exception(String),
    /// The job panicked
    #[error("job panicked: {0}")]
    Fatal(String),
    /// The execution context died without reporting an outcome
    #[error("{0}")]
    DirtyExit(String),
    #[error(transparent)]
    Factory(#[from] FactoryError),
    /// A non-veto listener error raised around the job
    #[error("listener failed: {0}")]
    Hook(String),
}

impl JobError {
    pub fn exception(message: impl std::fmt::Display) -> Self {
        JobError::Exception(message.to_string())
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            JobError::Fatal(_) => FailureKind::Fatal,
            JobError::DirtyExit(_) => FailureKind::DirtyExit,
            JobError::Exception(_) | JobError::Factory(_) | JobError::Hook(_) => {
                FailureKind::Exception
            }
        }
    }

    /// Short class-like name recorded alongside the message
    pub fn name(&self) -> &'static str {
        match self {
            JobError::Exception(_) => "Exception",
            JobError::Fatal(_) => "Fatal",
            JobError::DirtyExit(_) => "DirtyExit",
            JobError::Factory(_) => "Factory",
            JobError::Hook(_) => "Hook",
        }
    }
}

/// Category persisted in failure records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Ordinary error raised by job code or its collaborators
    Exception,
    /// Runtime fault (panic) inside the job
    Fatal,
    /// Inferred from abnormal termination of the execution context
    DirtyExit,
}
