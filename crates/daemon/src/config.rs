// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process configuration assembled from the environment

use std::path::PathBuf;
use std::time::Duration;

use qw_engine::{Isolation, NewJob, SchedulerConfig, WorkerConfig, DEFAULT_INTERVAL};

use crate::env;
use crate::error::DaemonError;

/// Where worker jobs run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsolationMode {
    /// Re-execute this binary per job
    Process,
    /// Run jobs on a task inside the worker
    Inline,
}

impl IsolationMode {
    fn parse(raw: &str) -> Result<Self, DaemonError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "process" | "fork" => Ok(IsolationMode::Process),
            "inline" | "in-process" => Ok(IsolationMode::Inline),
            _ => Err(DaemonError::Config(format!(
                "QW_ISOLATION must be `process` or `inline`, got {raw:?}"
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    pub namespace: String,
    /// Queues in priority order
    pub queues: Vec<String>,
    pub interval: Duration,
    pub blocking: bool,
    pub isolation: IsolationMode,
    /// `EnvFilter` directive
    pub log_filter: String,
    /// Log to this file instead of stderr
    pub log_file: Option<PathBuf>,
    pub prefix: Option<String>,
    pub process_pattern: Option<String>,
}

impl Config {
    /// Load configuration from `QW_*` variables
    pub fn load() -> Result<Self, DaemonError> {
        let isolation = match env::isolation() {
            Some(raw) => IsolationMode::parse(&raw)?,
            None => IsolationMode::Process,
        };
        Ok(Self {
            redis_url: env::redis_url(),
            namespace: env::namespace(),
            queues: env::queues(),
            interval: env::interval()?.unwrap_or(DEFAULT_INTERVAL),
            blocking: env::blocking()?,
            isolation,
            log_filter: env::log_filter(),
            log_file: env::log_file(),
            prefix: env::prefix(),
            process_pattern: env::process_pattern(),
        })
    }

    pub fn worker_config(&self) -> Result<WorkerConfig, DaemonError> {
        let isolation = match self.isolation {
            IsolationMode::Process => Isolation::current_exe()?,
            IsolationMode::Inline => Isolation::InProcess,
        };
        Ok(WorkerConfig::default()
            .with_interval(self.interval)
            .blocking(self.blocking)
            .with_isolation(isolation))
    }

    /// Job description carrying this process's status key prefix
    pub fn new_job(&self, queue: &str, class: &str) -> NewJob {
        let job = NewJob::new(queue, class);
        match &self.prefix {
            Some(prefix) => job.with_prefix(prefix.as_str()),
            None => job,
        }
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            interval: self.interval,
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
