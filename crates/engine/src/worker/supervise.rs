// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watching a running job

use super::Worker;
use crate::isolation::{ExitOutcome, RunningJob};
use qw_adapters::{ProcessProbe, Store};
use qw_core::Clock;

impl<S, P, C> Worker<S, P, C>
where
    S: Store,
    P: ProcessProbe,
    C: Clock,
{
    /// Poll the job until it ends, acting on kill requests in between
    pub(crate) async fn supervise(&mut self, mut running: RunningJob) -> ExitOutcome {
        self.child_pid = running.pid();
        tracing::info!(worker = %self.id, child = ?self.child_pid, "job started");

        let outcome = loop {
            if self.control.take_kill_request() {
                self.kill_child(&mut running);
            }
            match running.try_wait().await {
                Ok(Some(outcome)) => break outcome,
                Ok(None) => {}
                Err(e) => {
                    tracing::error!(worker = %self.id, error = %e, "lost track of job");
                    if let Err(e) = running.kill() {
                        tracing::warn!(worker = %self.id, error = %e, "kill failed");
                    }
                    break ExitOutcome::Abnormal(None);
                }
            }
            tokio::time::sleep(self.config.child_poll_interval).await;
        };

        self.child_pid = None;
        outcome
    }

    /// Kill the job; if there is nothing left to kill, shut down instead
    fn kill_child(&self, running: &mut RunningJob) {
        let alive = match running {
            RunningJob::Task(handle) => !handle.is_finished(),
            RunningJob::Process(child) => matches!(child.try_wait(), Ok(None)),
        };
        if !alive {
            tracing::info!(worker = %self.id, child = ?self.child_pid, "job not found, shutting down");
            self.control.shutdown();
            return;
        }
        tracing::info!(worker = %self.id, child = ?self.child_pid, "killing job");
        if let Err(e) = running.kill() {
            tracing::warn!(worker = %self.id, error = %e, "kill failed");
        }
    }
}
