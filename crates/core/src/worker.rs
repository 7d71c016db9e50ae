// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Worker identity.

crate::define_id! {
    /// Identity of one worker process: `<hostname>:<pid>:<queue,queue,...>`.
    ///
    /// Doubles as the member stored in the `workers` registry set and as the
    /// suffix of per-worker keys (`worker:<id>`, `stat:processed:<id>`).
    pub struct WorkerId;
}

/// The three parts of a [`WorkerId`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerParts<'a> {
    pub hostname: &'a str,
    pub pid: &'a str,
    pub queues: Vec<&'a str>,
}

impl WorkerParts<'_> {
    /// Numeric pid, if the pid part is a number.
    pub fn pid_number(&self) -> Option<u32> {
        self.pid.parse().ok()
    }
}

impl WorkerId {
    /// Build the identity of a worker process.
    pub fn compose<Q: AsRef<str>>(hostname: &str, pid: u32, queues: &[Q]) -> Self {
        let queues: Vec<&str> = queues.iter().map(AsRef::as_ref).collect();
        Self::new(format!("{}:{}:{}", hostname, pid, queues.join(",")))
    }

    /// Split the identity into hostname, pid and queue list.
    ///
    /// Returns `None` for strings that do not contain the `:` separators.
    /// The queue part is split on the first two colons only, so queue names
    /// may themselves contain colons.
    pub fn parts(&self) -> Option<WorkerParts<'_>> {
        let mut split = self.as_str().splitn(3, ':');
        let hostname = split.next()?;
        let pid = split.next()?;
        let queues = split.next()?;
        Some(WorkerParts {
            hostname,
            pid,
            queues: queues.split(',').filter(|q| !q.is_empty()).collect(),
        })
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
