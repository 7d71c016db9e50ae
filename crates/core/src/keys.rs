// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key space shared by producers, workers and the delayed scheduler.
//!
//! Keys are relative: the store applies its own namespace prefix
//! (see [`crate::namespace`]).

use crate::job::JobId;
use crate::worker::WorkerId;

/// Set of known queue names.
pub const QUEUES: &str = "queues";

/// Set of registered worker identities.
pub const WORKERS: &str = "workers";

/// List of recorded failures written by the default failure sink.
pub const FAILED: &str = "failed";

/// Sorted index of timestamps that have a non-empty delayed bucket.
pub const DELAYED_SCHEDULE: &str = "delayed_queue_schedule";

const QUEUE_PREFIX: &str = "queue:";

/// `queue:<name>`
pub fn queue(name: &str) -> String {
    format!("{}{}", QUEUE_PREFIX, name)
}

/// Recover the queue name from a `queue:<name>` key.
pub fn queue_name(key: &str) -> Option<&str> {
    key.strip_prefix(QUEUE_PREFIX)
}

/// `worker:<id>`: what the worker is currently processing.
pub fn worker(id: &WorkerId) -> String {
    format!("worker:{}", id)
}

/// `worker:<id>:started`
pub fn worker_started(id: &WorkerId) -> String {
    format!("worker:{}:started", id)
}

/// `stat:<name>`
pub fn stat(name: &str) -> String {
    format!("stat:{}", name)
}

/// Counter name scoped to one worker, e.g. `processed:<id>`.
pub fn worker_stat(name: &str, id: &WorkerId) -> String {
    format!("{}:{}", name, id)
}

/// `job:<prefix_><id>:status`; an empty prefix adds no separator.
pub fn job_status(prefix: &str, id: &JobId) -> String {
    if prefix.is_empty() {
        format!("job:{}:status", id)
    } else {
        format!("job:{}_{}:status", prefix, id)
    }
}

/// `job:<id>:pid`
pub fn job_pid(id: &JobId) -> String {
    format!("job:{}:pid", id)
}

/// `delayed:<timestamp>`
pub fn delayed(timestamp: i64) -> String {
    format!("delayed:{}", timestamp)
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
