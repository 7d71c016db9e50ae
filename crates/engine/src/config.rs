// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker and scheduler tuning

use std::path::PathBuf;
use std::time::Duration;

/// Default pause between empty polls
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// How often the supervisor checks on a running job
pub const DEFAULT_CHILD_POLL: Duration = Duration::from_millis(500);

/// Where a reserved job runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Isolation {
    /// A task inside the worker process. A panic is contained; an abort
    /// or a runaway allocation is not.
    InProcess,
    /// A fresh process running `program args...` in child mode
    Subprocess { program: PathBuf, args: Vec<String> },
}

impl Isolation {
    /// Re-execute the running binary
    pub fn current_exe() -> std::io::Result<Self> {
        Ok(Isolation::Subprocess {
            program: std::env::current_exe()?,
            args: Vec::new(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Sleep between empty polls; zero means "process what is there, then stop"
    pub interval: Duration,
    /// Reserve with one blocking multi-queue pop instead of polling each queue
    pub blocking: bool,
    pub isolation: Isolation,
    pub child_poll_interval: Duration,
    /// Exit when the parent process disappears
    pub has_parent: bool,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            blocking: false,
            isolation: Isolation::InProcess,
            child_poll_interval: DEFAULT_CHILD_POLL,
            has_parent: false,
        }
    }
}

impl WorkerConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn blocking(mut self, blocking: bool) -> Self {
        self.blocking = blocking;
        self
    }

    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_child_poll_interval(mut self, interval: Duration) -> Self {
        self.child_poll_interval = interval;
        self
    }

    pub fn with_parent(mut self, has_parent: bool) -> Self {
        self.has_parent = has_parent;
        self
    }
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}
