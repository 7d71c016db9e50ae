// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::error::DaemonError;

/// Install the global subscriber. Keep the guard alive until exit so
/// buffered lines are flushed.
pub fn setup_logging(config: &Config) -> Result<WorkerGuard, DaemonError> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| DaemonError::Config(format!("QW_LOG: {e}")))?;

    let (writer, guard) = match &config.log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(dir) if !dir.as_os_str().is_empty() => dir,
                _ => std::path::Path::new("."),
            };
            std::fs::create_dir_all(dir)?;
            let file_name = path
                .file_name()
                .ok_or_else(|| DaemonError::Config(format!("QW_LOG_FILE: {} is not a file", path.display())))?;
            tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name))
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(writer).with_ansi(config.log_file.is_none()))
        .try_init()
        .map_err(|e| DaemonError::Logging(e.to_string()))?;

    Ok(guard)
}

#[cfg(test)]
#[path = "logging_tests.rs"]
mod tests;
