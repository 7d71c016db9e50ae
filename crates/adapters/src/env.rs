// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

use crate::subprocess::PS_TIMEOUT;
use std::time::Duration;

fn parse_duration_ms(var: &str) -> Option<Duration> {
    std::env::var(var)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
}

/// Timeout for process table listings (default: 5000ms).
pub fn ps_timeout() -> Duration {
    parse_duration_ms("QW_PS_TIMEOUT_MS").unwrap_or(PS_TIMEOUT)
}

/// Store calls slower than this are logged at warn level (default: 250ms).
pub fn slow_store_threshold() -> Duration {
    parse_duration_ms("QW_SLOW_STORE_MS").unwrap_or(Duration::from_millis(250))
}
