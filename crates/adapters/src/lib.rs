// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
// Enable coverage(off) attribute for excluding test infrastructure
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Adapters for external I/O: the keyed store and host process probes

mod env;
pub mod process;
pub mod store;
pub mod subprocess;
pub mod traced;

pub use process::{ProbeError, ProcessProbe, PsProbe};
pub use store::{MemoryStore, ScoreBound, Store, StoreError};
#[cfg(feature = "redis")]
pub use store::{summarize_redis_dsn, RedisStore};
pub use traced::TracedStore;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use process::FakeProbe;
