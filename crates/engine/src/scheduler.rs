// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Delayed jobs
//!
//! Items wait in `delayed:<ts>` lists; `delayed_queue_schedule` indexes the
//! timestamps that still have a list. A sweep drains every due timestamp,
//! oldest first, before the loop sleeps again.

use crate::client::Client;
use crate::config::SchedulerConfig;
use crate::control::Control;
use crate::error::EngineError;
use crate::event_bus::{Event, Hook, HookError};
use crate::job::args_list;
use qw_adapters::{ScoreBound, Store};
use qw_core::{keys, Clock, DelayedItem, SystemClock};
use serde_json::Value;
use std::time::Duration;

pub struct DelayedScheduler<S, C: Clock = SystemClock> {
    client: Client<S, C>,
    control: Control,
}

impl<S: Store, C: Clock> DelayedScheduler<S, C> {
    pub fn new(client: Client<S, C>) -> Self {
        Self {
            client,
            control: Control::new(),
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.control = control;
        self
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    /// Run `class` on `queue` no earlier than `timestamp` (UNIX seconds)
    pub async fn schedule(
        &self,
        timestamp: i64,
        queue: &str,
        class: &str,
        args: Value,
    ) -> Result<(), EngineError> {
        let item = DelayedItem {
            queue: queue.to_string(),
            class: class.to_string(),
            args: args_list(args)?,
        };
        let json = serde_json::to_string(&item)?;
        let store = self.client.store();
        store.rpush(&keys::delayed(timestamp), &json).await?;
        store
            .zadd(keys::DELAYED_SCHEDULE, timestamp, &timestamp.to_string())
            .await?;
        tracing::debug!(timestamp, queue, class, "scheduled delayed job");
        Ok(())
    }

    /// Run `class` on `queue` once `delay` has passed
    pub async fn schedule_in(
        &self,
        delay: Duration,
        queue: &str,
        class: &str,
        args: Value,
    ) -> Result<(), EngineError> {
        let at = self.client.clock().epoch_secs() + delay.as_secs() as i64;
        self.schedule(at, queue, class, args).await
    }

    /// Number of timestamps with pending items
    pub async fn delayed_queue_size(&self) -> Result<u64, EngineError> {
        Ok(self.client.store().zcard(keys::DELAYED_SCHEDULE).await?)
    }

    /// Number of items waiting at `timestamp`
    pub async fn delayed_timestamp_size(&self, timestamp: i64) -> Result<u64, EngineError> {
        Ok(self.client.store().llen(&keys::delayed(timestamp)).await?)
    }

    /// Oldest timestamp at or before `before` (default: now)
    pub async fn next_delayed_timestamp(
        &self,
        before: Option<i64>,
    ) -> Result<Option<i64>, EngineError> {
        let before = before.unwrap_or_else(|| self.client.clock().epoch_secs());
        let members = self
            .client
            .store()
            .zrangebyscore(keys::DELAYED_SCHEDULE, ScoreBound::NegInfinity, before, 1)
            .await?;
        Ok(members.first().and_then(|m| m.parse().ok()))
    }

    /// Pop the oldest item at `timestamp`. Drops the timestamp from the
    /// index once its list is empty.
    pub async fn next_item_for_timestamp(
        &self,
        timestamp: i64,
    ) -> Result<Option<DelayedItem>, EngineError> {
        let store = self.client.store();
        let key = keys::delayed(timestamp);
        let raw = store.lpop(&key).await?;

        if store.llen(&key).await? == 0 {
            store.del(&key).await?;
            store
                .zrem(keys::DELAYED_SCHEDULE, &timestamp.to_string())
                .await?;
        }

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    /// Move every item at `timestamp` onto its queue, in insertion order.
    /// Returns how many were enqueued.
    pub async fn enqueue_delayed_items_for_timestamp(
        &self,
        timestamp: i64,
    ) -> Result<usize, EngineError> {
        let mut enqueued = 0;
        loop {
            let item = match self.next_item_for_timestamp(timestamp).await {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(EngineError::Malformed(e)) => {
                    tracing::warn!(timestamp, error = %e, "dropping unreadable delayed item");
                    continue;
                }
                Err(e) => return Err(e),
            };

            match self
                .client
                .events()
                .trigger(Hook::BeforeDelayedEnqueue, &Event::DelayedEnqueue(&item))
            {
                Ok(()) => {}
                Err(HookError::DoNotCreate) => {
                    tracing::info!(queue = %item.queue, class = %item.class, "delayed enqueue vetoed");
                    continue;
                }
                Err(e) => return Err(EngineError::Listener(e.to_string())),
            }

            tracing::info!(queue = %item.queue, class = %item.class, timestamp, "queueing delayed job");
            if self
                .client
                .enqueue(&item.queue, &item.class, Value::Array(item.args), false)
                .await?
                .is_some()
            {
                enqueued += 1;
            }
        }
        Ok(enqueued)
    }

    /// Drain every timestamp at or before `before` (default: now)
    pub async fn handle_delayed_items(&self, before: Option<i64>) -> Result<usize, EngineError> {
        let mut enqueued = 0;
        while let Some(timestamp) = self.next_delayed_timestamp(before).await? {
            enqueued += self.enqueue_delayed_items_for_timestamp(timestamp).await?;
        }
        Ok(enqueued)
    }

    /// Sweep, sleep, repeat until shut down
    pub async fn work(&self, config: &SchedulerConfig) {
        tracing::info!(interval_ms = config.interval.as_millis() as u64, "scheduler started");
        while !self.control.is_shutdown() {
            if !self.control.is_paused() {
                match self.handle_delayed_items(None).await {
                    Ok(0) => {}
                    Ok(n) => tracing::info!(enqueued = n, "promoted delayed jobs"),
                    Err(e) => tracing::error!(error = %e, "delayed sweep failed"),
                }
            }
            self.control.sleep(config.interval).await;
        }
        tracing::info!("scheduler stopped");
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
