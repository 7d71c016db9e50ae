// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-process store
//!
//! Shares state between clones, so one worker, its in-process job tasks and
//! the delayed scheduler can all run against the same instance. Expiry is
//! evaluated lazily against the injected clock.

use super::{ScoreBound, Store, StoreError};
use async_trait::async_trait;
use parking_lot::Mutex;
use qw_core::{Clock, SystemClock};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

enum Value {
    Str(String),
    List(VecDeque<String>),
    Set(BTreeSet<String>),
    Sorted(HashMap<String, i64>),
}

impl Value {
    fn is_empty_container(&self) -> bool {
        match self {
            Value::Str(_) => false,
            Value::List(list) => list.is_empty(),
            Value::Set(set) => set.is_empty(),
            Value::Sorted(zset) => zset.is_empty(),
        }
    }
}

struct Entry {
    value: Value,
    expires_at_ms: Option<u64>,
}

#[derive(Default)]
struct MemoryState {
    entries: HashMap<String, Entry>,
}

impl MemoryState {
    fn purge_expired(&mut self, key: &str, now_ms: u64) {
        let expired = self
            .entries
            .get(key)
            .and_then(|e| e.expires_at_ms)
            .is_some_and(|at| at <= now_ms);
        if expired {
            self.entries.remove(key);
        }
    }

    fn value(&mut self, key: &str, now_ms: u64) -> Option<&mut Value> {
        self.purge_expired(key, now_ms);
        self.entries.get_mut(key).map(|e| &mut e.value)
    }

    fn value_or_insert(&mut self, key: &str, now_ms: u64, make: fn() -> Value) -> &mut Value {
        self.purge_expired(key, now_ms);
        &mut self
            .entries
            .entry(key.to_string())
            .or_insert_with(|| Entry {
                value: make(),
                expires_at_ms: None,
            })
            .value
    }

    /// Containers that became empty disappear, as in the real store.
    fn tidy(&mut self, key: &str) {
        if self
            .entries
            .get(key)
            .is_some_and(|e| e.value.is_empty_container())
        {
            self.entries.remove(key);
        }
    }
}

fn wrong_type(key: &str) -> StoreError {
    StoreError::WrongType(key.to_string())
}

/// Store kept entirely in process memory
#[derive(Clone)]
pub struct MemoryStore<C: Clock = SystemClock> {
    state: Arc<Mutex<MemoryState>>,
    pushed: Arc<Notify>,
    reachable: Arc<AtomicBool>,
    clock: C,
}

impl MemoryStore<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for MemoryStore<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> MemoryStore<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Arc::new(Mutex::new(MemoryState::default())),
            pushed: Arc::new(Notify::new()),
            reachable: Arc::new(AtomicBool::new(true)),
            clock,
        }
    }

    /// Simulate an outage: while unreachable every call fails with
    /// [`StoreError::Unavailable`].
    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::SeqCst);
    }

    /// Live (non-expired) keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        state
            .entries
            .retain(|_, e| !e.expires_at_ms.is_some_and(|at| at <= now));
        let mut keys: Vec<String> = state.entries.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Remaining time to live of a key, if it has an expiry
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        state.purge_expired(key, now);
        state
            .entries
            .get(key)
            .and_then(|e| e.expires_at_ms)
            .map(|at| Duration::from_millis(at.saturating_sub(now)))
    }

    /// Drop everything
    pub fn flush(&self) {
        self.state.lock().entries.clear();
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.reachable.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("memory store marked unreachable".to_string()))
        }
    }

    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut MemoryState, u64) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        self.check()?;
        let now = self.clock.epoch_ms();
        let mut state = self.state.lock();
        f(&mut state, now)
    }

    fn pop_head(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_state(|state, now| {
            let popped = match state.value(key, now) {
                None => None,
                Some(Value::List(list)) => list.pop_front(),
                Some(_) => return Err(wrong_type(key)),
            };
            state.tidy(key);
            Ok(popped)
        })
    }
}

#[async_trait]
impl<C: Clock> Store for MemoryStore<C> {
    async fn ping(&self) -> Result<(), StoreError> {
        self.check()
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let len = self.with_state(|state, now| {
            match state.value_or_insert(key, now, || Value::List(VecDeque::new())) {
                Value::List(list) => {
                    list.push_back(value.to_string());
                    Ok(list.len() as u64)
                }
                _ => Err(wrong_type(key)),
            }
        })?;
        self.pushed.notify_waiters();
        Ok(len)
    }

    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.pop_head(key)
    }

    async fn blpop(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, String)>, StoreError> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            // Register interest before checking so a push between the check
            // and the wait is not missed.
            let notified = self.pushed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            for key in keys {
                if let Some(value) = self.pop_head(key)? {
                    return Ok(Some((key.clone(), value)));
                }
            }

            let now = tokio::time::Instant::now();
            if now >= deadline {
                return Ok(None);
            }
            if tokio::time::timeout(deadline - now, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(0),
            Some(Value::List(list)) => Ok(list.len() as u64),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(Vec::new()),
            Some(Value::List(list)) => {
                let len = list.len() as i64;
                let resolve = |i: i64| if i < 0 { len + i } else { i };
                let start = resolve(start).max(0);
                let stop = resolve(stop).min(len - 1);
                if start > stop {
                    return Ok(Vec::new());
                }
                Ok(list
                    .iter()
                    .skip(start as usize)
                    .take((stop - start + 1) as usize)
                    .cloned()
                    .collect())
            }
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.with_state(|state, now| {
            match state.value_or_insert(key, now, || Value::Set(BTreeSet::new())) {
                Value::Set(set) => Ok(set.insert(member.to_string())),
                _ => Err(wrong_type(key)),
            }
        })
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.with_state(|state, now| {
            let removed = match state.value(key, now) {
                None => false,
                Some(Value::Set(set)) => set.remove(member),
                Some(_) => return Err(wrong_type(key)),
            };
            state.tidy(key);
            Ok(removed)
        })
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(Vec::new()),
            Some(Value::Set(set)) => Ok(set.iter().cloned().collect()),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(false),
            Some(Value::Set(set)) => Ok(set.contains(member)),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        self.with_state(|state, now| {
            match state.value_or_insert(key, now, || Value::Sorted(HashMap::new())) {
                Value::Sorted(zset) => {
                    zset.insert(member.to_string(), score);
                    Ok(())
                }
                _ => Err(wrong_type(key)),
            }
        })
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        self.with_state(|state, now| {
            let removed = match state.value(key, now) {
                None => false,
                Some(Value::Sorted(zset)) => zset.remove(member).is_some(),
                Some(_) => return Err(wrong_type(key)),
            };
            state.tidy(key);
            Ok(removed)
        })
    }

    async fn zrangebyscore(
        &self,
        key: &str,
        min: ScoreBound,
        max: i64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(Vec::new()),
            Some(Value::Sorted(zset)) => {
                let mut hits: Vec<(i64, &String)> = zset
                    .iter()
                    .filter(|&(_, &score)| {
                        score <= max
                            && match min {
                                ScoreBound::NegInfinity => true,
                                ScoreBound::Inclusive(lo) => score >= lo,
                            }
                    })
                    .map(|(member, &score)| (score, member))
                    .collect();
                hits.sort();
                Ok(hits
                    .into_iter()
                    .take(limit)
                    .map(|(_, member)| member.clone())
                    .collect())
            }
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(0),
            Some(Value::Sorted(zset)) => Ok(zset.len() as u64),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.with_state(|state, now| match state.value(key, now) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(_) => Err(wrong_type(key)),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.with_state(|state, _| {
            state.entries.insert(
                key.to_string(),
                Entry {
                    value: Value::Str(value.to_string()),
                    expires_at_ms: None,
                },
            );
            Ok(())
        })
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        self.with_state(|state, now| {
            state.purge_expired(key, now);
            Ok(state.entries.remove(key).is_some())
        })
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.with_state(|state, now| Ok(state.value(key, now).is_some()))
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        self.with_state(|state, now| {
            state.purge_expired(key, now);
            match state.entries.get_mut(key) {
                Some(entry) => {
                    entry.expires_at_ms = Some(now + ttl.as_millis() as u64);
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    async fn incr_by(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        self.with_state(|state, now| {
            match state.value_or_insert(key, now, || Value::Str("0".to_string())) {
                Value::Str(s) => {
                    let current: i64 = s.parse().map_err(|_| wrong_type(key))?;
                    let next = current + by;
                    *s = next.to_string();
                    Ok(next)
                }
                _ => Err(wrong_type(key)),
            }
        })
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
