// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Clock abstraction for deterministic tests.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Source of monotonic and wall-clock time.
pub trait Clock: Clone + Send + Sync + 'static {
    /// Monotonic instant, used for measuring elapsed time.
    fn now(&self) -> Instant;

    /// Wall-clock time as milliseconds since the UNIX epoch.
    fn epoch_ms(&self) -> u64;

    /// Wall-clock time as whole seconds since the UNIX epoch.
    fn epoch_secs(&self) -> i64 {
        (self.epoch_ms() / 1000) as i64
    }
}

/// Real system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn epoch_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

struct FakeClockState {
    base: Instant,
    offset: Duration,
    epoch_ms: u64,
}

/// Manually advanced clock for tests.
///
/// Clones share the same underlying time, so a test can hold one handle and
/// advance the time seen by every component built from the others.
#[derive(Clone)]
pub struct FakeClock {
    inner: Arc<Mutex<FakeClockState>>,
}

/// 2026-01-01T00:00:00Z
const FAKE_EPOCH_START_MS: u64 = 1_767_225_600_000;

impl FakeClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeClockState {
                base: Instant::now(),
                offset: Duration::ZERO,
                epoch_ms: FAKE_EPOCH_START_MS,
            })),
        }
    }

    /// Move both the monotonic and the wall clock forward.
    pub fn advance(&self, by: Duration) {
        let mut state = self.inner.lock();
        state.offset += by;
        state.epoch_ms += by.as_millis() as u64;
    }

    /// Pin the wall clock to an exact epoch time (milliseconds).
    pub fn set_epoch_ms(&self, ms: u64) {
        self.inner.lock().epoch_ms = ms;
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        let state = self.inner.lock();
        state.base + state.offset
    }

    fn epoch_ms(&self) -> u64 {
        self.inner.lock().epoch_ms
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
