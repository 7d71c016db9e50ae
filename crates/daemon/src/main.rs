// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delayed job scheduler (qw-scheduler)
//!
//! Promotes due delayed jobs into their queues. Configured through `QW_*`
//! environment variables.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("qw-scheduler {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                print!("{}", usage());
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: qw-scheduler [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    qw_daemon::run_scheduler().await?;
    Ok(())
}

fn usage() -> String {
    format!(
        "qw-scheduler {version}
Moves delayed jobs into their queues once they are due

USAGE:
    qw-scheduler

ENVIRONMENT:
    QW_REDIS_URL     Store DSN (default {redis})
    QW_NAMESPACE     Key namespace (default {namespace})
    QW_INTERVAL      Seconds between sweeps (default 5)
    QW_LOG           Log filter (default info)
    QW_LOG_FILE      Log to this file instead of stderr

SIGNALS:
    TERM, INT, QUIT  Finish the current sweep and exit

OPTIONS:
    -h, --help       Print help information
    -v, --version    Print version information
",
        version = env!("CARGO_PKG_VERSION"),
        redis = qw_daemon::env::DEFAULT_REDIS_URL,
        namespace = qw_daemon::env::DEFAULT_NAMESPACE,
    )
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
