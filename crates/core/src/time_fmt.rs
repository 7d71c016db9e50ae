// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp and duration formatting shared by log lines and stored records.

use chrono::{DateTime, SecondsFormat, Utc};

/// Format seconds as a short human-readable duration: `"5s"`, `"2m"`, `"1h30m"`, `"3d"`.
pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{}h{}m", h, m)
        } else {
            format!("{}h", h)
        }
    } else {
        format!("{}d", secs / 86400)
    }
}

/// Format milliseconds; sub-second values are shown in ms.
pub fn format_elapsed_ms(ms: u64) -> String {
    if ms < 1000 {
        format!("{}ms", ms)
    } else {
        format_elapsed(ms / 1000)
    }
}

/// ISO-8601 / RFC 3339 timestamp in UTC with second precision,
/// e.g. `2026-01-01T00:00:00+00:00`.
pub fn iso8601(epoch_ms: u64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms as i64)
        .unwrap_or_default()
        .to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// Epoch seconds as a float with sub-second precision, the `queue_time` format.
pub fn epoch_float(epoch_ms: u64) -> f64 {
    epoch_ms as f64 / 1000.0
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
