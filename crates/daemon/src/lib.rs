// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Process plumbing for queue workers and the delayed scheduler.
//!
//! A worker binary registers its job classes and hands over to
//! [`run_worker`]:
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> Result<(), qw_daemon::DaemonError> {
//!     let registry = qw_engine::Registry::new();
//!     registry.register("SendMail", SendMail::new);
//!     qw_daemon::run_worker(registry).await
//! }
//! ```
//!
//! With process isolation the same binary is re-executed for every job;
//! [`run_worker`] notices child mode and runs just that job.

pub mod config;
pub mod env;
mod error;
pub mod logging;
pub mod signals;

pub use config::{Config, IsolationMode};
pub use error::DaemonError;
pub use logging::setup_logging;

use qw_adapters::{PsProbe, RedisStore, TracedStore};
use qw_core::Namespace;
use qw_engine::{
    is_child_process, run_child, ChildRequest, Client, DelayedScheduler, Registry, Worker,
};

/// Client over the traced Redis store
pub type RedisClient = Client<TracedStore<RedisStore>>;

/// Connect to the store named by `config`
pub async fn connect(config: &Config) -> Result<RedisClient, DaemonError> {
    let store = RedisStore::connect(&config.redis_url, Namespace::new(config.namespace.as_str()))
        .await?;
    Ok(Client::new(TracedStore::new(store)))
}

/// Probe that recognizes this deployment's worker processes
pub fn process_probe(config: &Config) -> PsProbe {
    match &config.process_pattern {
        Some(pattern) => PsProbe::new(pattern.as_str()),
        None => PsProbe::for_current_exe(),
    }
}

/// Run a worker process, or a single job when started in child mode
pub async fn run_worker(registry: Registry) -> Result<(), DaemonError> {
    let config = Config::load()?;
    let _log_guard = setup_logging(&config)?;
    let client = connect(&config).await?.with_factory(registry);

    if is_child_process() {
        let request = ChildRequest::read_from(tokio::io::stdin()).await?;
        tracing::debug!(queue = %request.queue, class = %request.payload.class, "running job in child mode");
        run_child(&client, request).await?;
        return Ok(());
    }

    let mut worker = Worker::new(
        client,
        process_probe(&config),
        config.queues.clone(),
        config.worker_config()?,
    )
    .await?;
    let signals = signals::spawn_worker_signals(worker.control().clone())?;
    tracing::info!(worker = %worker, "starting worker");

    let result = worker.work().await;
    signals.abort();
    if let Err(e) = &result {
        tracing::error!(worker = %worker, error = %e, "worker stopped with an error");
    }
    Ok(result?)
}

/// Run the delayed-job promotion loop until signalled
pub async fn run_scheduler() -> Result<(), DaemonError> {
    let config = Config::load()?;
    let _log_guard = setup_logging(&config)?;
    let client = connect(&config).await?;

    let scheduler = DelayedScheduler::new(client);
    let signals = signals::spawn_scheduler_signals(scheduler.control().clone())?;
    scheduler.work(&config.scheduler_config()).await;
    signals.abort();
    Ok(())
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
