// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! qw-core: plain data shared by the queue worker crates

pub mod clock;
pub mod id;
pub mod job;
pub mod keys;
pub mod namespace;
pub mod status;
pub mod time_fmt;
pub mod worker;

pub use clock::{Clock, FakeClock, SystemClock};
pub use id::{IdGen, SequentialIdGen, UuidIdGen};
pub use job::{DelayedItem, JobId, JobPayload};
pub use namespace::{scoped_key, split_scoped_key, Namespace};
pub use status::{JobStatus, StatusPacket, TERMINAL_STATUS_TTL_SECS};
pub use time_fmt::{epoch_float, format_elapsed, format_elapsed_ms, iso8601};
pub use worker::{WorkerId, WorkerParts};
