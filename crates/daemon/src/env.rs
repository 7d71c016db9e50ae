// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::DaemonError;

pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
pub const DEFAULT_NAMESPACE: &str = "resque";

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Store DSN: QW_REDIS_URL > redis://127.0.0.1:6379
pub fn redis_url() -> String {
    var("QW_REDIS_URL").unwrap_or_else(|| DEFAULT_REDIS_URL.to_string())
}

/// Key namespace: QW_NAMESPACE > resque
pub fn namespace() -> String {
    var("QW_NAMESPACE").unwrap_or_else(|| DEFAULT_NAMESPACE.to_string())
}

/// Queues in priority order from QW_QUEUE (comma separated), default `*`
pub fn queues() -> Vec<String> {
    let queues: Vec<String> = var("QW_QUEUE")
        .unwrap_or_else(|| "*".to_string())
        .split(',')
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();
    if queues.is_empty() {
        vec!["*".to_string()]
    } else {
        queues
    }
}

/// Poll interval in whole or fractional seconds
pub fn interval() -> Result<Option<Duration>, DaemonError> {
    let Some(raw) = var("QW_INTERVAL") else {
        return Ok(None);
    };
    let secs: f64 = raw
        .trim()
        .parse()
        .map_err(|_| DaemonError::Config(format!("QW_INTERVAL must be a number, got {raw:?}")))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(DaemonError::Config(format!(
            "QW_INTERVAL must not be negative, got {raw:?}"
        )));
    }
    Ok(Some(Duration::from_secs_f64(secs)))
}

pub fn blocking() -> Result<bool, DaemonError> {
    match var("QW_BLOCKING") {
        None => Ok(false),
        Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(DaemonError::Config(format!(
                "QW_BLOCKING must be a boolean, got {raw:?}"
            ))),
        },
    }
}

/// Raw QW_ISOLATION value, if set
pub fn isolation() -> Option<String> {
    var("QW_ISOLATION")
}

/// Log filter directive: QW_LOG > info
pub fn log_filter() -> String {
    var("QW_LOG").unwrap_or_else(|| "info".to_string())
}

pub fn log_file() -> Option<PathBuf> {
    var("QW_LOG_FILE").map(PathBuf::from)
}

/// Status key prefix for jobs enqueued by this process
pub fn prefix() -> Option<String> {
    var("QW_PREFIX")
}

/// Command-line substring that identifies worker processes on this host
pub fn process_pattern() -> Option<String> {
    var("QW_PROCESS_PATTERN")
}
