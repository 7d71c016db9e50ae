// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[yare::parameterized(
    zero_seconds     = { 0,      "0s" },
    max_seconds      = { 59,     "59s" },
    one_minute       = { 60,     "1m" },
    one_hour         = { 3600,   "1h" },
    hour_and_minutes = { 3660,   "1h1m" },
    one_day          = { 86400,  "1d" },
)]
fn elapsed(secs: u64, expected: &str) {
    assert_eq!(format_elapsed(secs), expected);
}

#[yare::parameterized(
    sub_second   = { 250,       "250ms" },
    five_seconds = { 5_000,     "5s" },
    two_minutes  = { 120_000,   "2m" },
)]
fn elapsed_ms(ms: u64, expected: &str) {
    assert_eq!(format_elapsed_ms(ms), expected);
}

#[test]
fn iso8601_formats_utc_seconds() {
    assert_eq!(iso8601(1_767_225_600_000), "2026-01-01T00:00:00+00:00");
    assert_eq!(iso8601(1_767_225_600_999), "2026-01-01T00:00:00+00:00");
}

#[test]
fn epoch_float_keeps_millis() {
    assert_eq!(epoch_float(1_500), 1.5);
}
