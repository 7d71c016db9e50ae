// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn queue_key_roundtrips() {
    let key = queue("high");
    assert_eq!(key, "queue:high");
    assert_eq!(queue_name(&key), Some("high"));
    assert_eq!(queue_name("stat:processed"), None);
}

#[yare::parameterized(
    no_prefix   = { "",     "job:abc:status" },
    with_prefix = { "tenant", "job:tenant_abc:status" },
)]
fn job_status_key(prefix: &str, expected: &str) {
    assert_eq!(job_status(prefix, &JobId::new("abc")), expected);
}

#[test]
fn worker_keys() {
    let id = WorkerId::new("box:1:jobs");
    assert_eq!(worker(&id), "worker:box:1:jobs");
    assert_eq!(worker_started(&id), "worker:box:1:jobs:started");
    assert_eq!(stat(&worker_stat("processed", &id)), "stat:processed:box:1:jobs");
}

#[test]
fn delayed_and_pid_keys() {
    assert_eq!(delayed(1_700_000_000), "delayed:1700000000");
    assert_eq!(job_pid(&JobId::new("abc")), "job:abc:pid");
}
