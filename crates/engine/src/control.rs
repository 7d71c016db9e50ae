// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Out-of-band control flags for a running worker or scheduler
//!
//! Signal handlers (or tests) flip these; the work loop reads them between
//! jobs. Sleeps taken through [`Control::sleep`] wake early on any change.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[derive(Default)]
struct Flags {
    shutdown: AtomicBool,
    paused: AtomicBool,
    kill_child: AtomicBool,
    changed: Notify,
}

/// Shared handle; clones control the same loop
#[derive(Clone, Default)]
pub struct Control {
    flags: Arc<Flags>,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish the current job, then exit
    pub fn shutdown(&self) {
        tracing::info!("shutdown requested");
        self.flags.shutdown.store(true, Ordering::SeqCst);
        self.wake();
    }

    /// Exit now, killing any running job first
    pub fn shutdown_now(&self) {
        tracing::info!("immediate shutdown requested");
        self.flags.shutdown.store(true, Ordering::SeqCst);
        self.flags.kill_child.store(true, Ordering::SeqCst);
        self.wake();
    }

    /// Kill the running job but keep working
    pub fn kill_child(&self) {
        tracing::info!("kill of running job requested");
        self.flags.kill_child.store(true, Ordering::SeqCst);
        self.wake();
    }

    /// Stop picking up new jobs
    pub fn pause(&self) {
        tracing::info!("pausing job processing");
        self.flags.paused.store(true, Ordering::SeqCst);
        self.wake();
    }

    pub fn resume(&self) {
        tracing::info!("resuming job processing");
        self.flags.paused.store(false, Ordering::SeqCst);
        self.wake();
    }

    pub fn is_shutdown(&self) -> bool {
        self.flags.shutdown.load(Ordering::SeqCst)
    }

    pub fn is_paused(&self) -> bool {
        self.flags.paused.load(Ordering::SeqCst)
    }

    /// Consume a pending kill request
    pub fn take_kill_request(&self) -> bool {
        self.flags.kill_child.swap(false, Ordering::SeqCst)
    }

    /// Sleep for `duration`, returning early if any flag changes
    pub async fn sleep(&self, duration: Duration) {
        let changed = self.flags.changed.notified();
        tokio::pin!(changed);
        changed.as_mut().enable();
        if self.is_shutdown() {
            return;
        }
        tokio::select! {
            _ = tokio::time::sleep(duration) => {}
            _ = changed => {}
        }
    }

    fn wake(&self) {
        self.flags.changed.notify_waiters();
    }
}

impl std::fmt::Debug for Control {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Control")
            .field("shutdown", &self.is_shutdown())
            .field("paused", &self.is_paused())
            .finish()
    }
}

#[cfg(test)]
#[path = "control_tests.rs"]
mod tests;
