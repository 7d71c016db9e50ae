// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Queue Works job engine: enqueueing, workers, status tracking and the
//! delayed scheduler

mod child;
mod client;
mod config;
mod control;
mod error;
mod event_bus;
mod factory;
mod failure;
mod isolation;
mod job;
mod pid;
mod scheduler;
mod stat;
mod status;
mod worker;

#[cfg(test)]
mod test_helpers;

pub use child::{is_child_process, run_child, ChildRequest, CHILD_ENV};
pub use client::Client;
pub use config::{Isolation, SchedulerConfig, WorkerConfig, DEFAULT_CHILD_POLL, DEFAULT_INTERVAL};
pub use control::Control;
pub use error::{EngineError, FailureKind, JobError};
pub use event_bus::{Event, EventBus, Hook, HookError, JobRef, Listener};
pub use factory::{FactoryError, JobArgs, JobFactory, Perform, PerformError, Registry};
pub use failure::{Failure, FailureSink, Failures, LogFailureSink, StoreFailureSink};
pub use isolation::{launch, ExitOutcome, RunningJob};
pub use job::{JobHandle, NewJob, Performed};
pub use pid::JobPid;
pub use scheduler::DelayedScheduler;
pub use stat::Stat;
pub use status::Status;
pub use worker::{Worker, WorkerState, WorkingOn};
