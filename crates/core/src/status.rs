// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job status codes and the persisted status packet.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Lifecycle state of a tracked job.
///
/// The runtime only moves `Waiting -> Running -> {Failed | Complete}`, but
/// nothing enforces the order: any writer may store any known code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum JobStatus {
    Waiting = 1,
    Running = 2,
    Failed = 3,
    Complete = 4,
}

impl JobStatus {
    /// Numeric code stored in the status packet.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Parse a stored code; unknown codes yield `None`.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(JobStatus::Waiting),
            2 => Some(JobStatus::Running),
            3 => Some(JobStatus::Failed),
            4 => Some(JobStatus::Complete),
            _ => None,
        }
    }

    /// Failed and Complete records expire; the others never do.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Complete)
    }

    /// Still queued or executing.
    pub fn is_pending(self) -> bool {
        matches!(self, JobStatus::Waiting | JobStatus::Running)
    }
}

impl From<JobStatus> for u8 {
    fn from(status: JobStatus) -> Self {
        status.code()
    }
}

impl TryFrom<u8> for JobStatus {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        JobStatus::from_code(i64::from(code)).ok_or_else(|| format!("unknown job status {}", code))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Waiting => write!(f, "waiting"),
            JobStatus::Running => write!(f, "running"),
            JobStatus::Failed => write!(f, "failed"),
            JobStatus::Complete => write!(f, "complete"),
        }
    }
}

/// Seconds a terminal status record stays readable.
pub const TERMINAL_STATUS_TTL_SECS: u64 = 86_400;

/// JSON document stored under `job:<prefix_><id>:status`.
///
/// `status` is kept as the raw code so records written by other producers
/// with unexpected values still parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusPacket {
    pub status: i64,
    #[serde(default)]
    pub updated: Option<i64>,
    #[serde(default)]
    pub started: Option<i64>,
    #[serde(default)]
    pub result: Option<Value>,
}

impl StatusPacket {
    pub fn new(status: JobStatus, now_secs: i64) -> Self {
        Self {
            status: i64::from(status.code()),
            updated: Some(now_secs),
            started: Some(now_secs),
            result: None,
        }
    }

    /// Known status, if the stored code is one.
    pub fn job_status(&self) -> Option<JobStatus> {
        JobStatus::from_code(self.status)
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
