// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    empty     = { "",        "queue:jobs", "queue:jobs" },
    plain     = { "resque",  "queue:jobs", "resque:queue:jobs" },
    trailing  = { "resque:", "workers",    "resque:workers" },
)]
fn namespace_key(ns: &str, key: &str, expected: &str) {
    assert_eq!(Namespace::new(ns).key(key), expected);
}

#[test]
fn strip_inverts_key() {
    let ns = Namespace::new("resque");
    assert_eq!(ns.strip("resque:queue:jobs"), "queue:jobs");
}

#[test]
fn strip_leaves_foreign_keys_alone() {
    let ns = Namespace::new("resque");
    assert_eq!(ns.strip("other:queue:jobs"), "other:queue:jobs");
    assert_eq!(ns.strip("resquex:queue"), "resquex:queue");
}

#[test]
fn empty_namespace_is_identity() {
    let ns = Namespace::default();
    assert_eq!(ns.key("a"), "a");
    assert_eq!(ns.strip("a:b"), "a:b");
}
