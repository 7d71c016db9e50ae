// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Keyed store adapters
//!
//! The store is the only shared mutable resource between producers,
//! workers and the delayed scheduler. Every operation is a single-key
//! atomic step; callers never assume multi-key transactions.

mod memory;
#[cfg(feature = "redis")]
mod redis_store;

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::{summarize_redis_dsn, RedisStore};

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors from store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached; callers treat this as transient.
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store command failed: {0}")]
    Command(String),
    #[error("wrong kind of value at key {0}")]
    WrongType(String),
}

impl StoreError {
    /// Whether the failure is an infrastructure outage rather than a bad command.
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Lower bound of a sorted-set range query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBound {
    NegInfinity,
    Inclusive(i64),
}

/// Adapter for the keyed store backing queues, registries, counters and
/// status records.
///
/// Keys are relative; implementations apply their own namespace.
#[async_trait]
pub trait Store: Clone + Send + Sync + 'static {
    /// Liveness probe
    async fn ping(&self) -> Result<(), StoreError>;

    /// Append to the tail of a list, returning the new length
    async fn rpush(&self, key: &str, value: &str) -> Result<u64, StoreError>;

    /// Remove and return the head of a list
    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Pop the head of the first non-empty list in `keys`, waiting up to
    /// `timeout` for one to receive data.
    ///
    /// Returns the key the value came from. A zero timeout checks once and
    /// returns immediately; the wait is never unbounded.
    async fn blpop(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, String)>, StoreError>;

    /// Length of a list (0 when absent)
    async fn llen(&self, key: &str) -> Result<u64, StoreError>;

    /// Inclusive range of list elements; negative indexes count from the tail
    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError>;

    /// Add a set member, returning whether it was new
    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Remove a set member, returning whether it was present
    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// All members of a set
    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError>;

    /// Set membership test
    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Add or re-score a sorted-set member
    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError>;

    /// Remove a sorted-set member, returning whether it was present
    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError>;

    /// Members with `min <= score <= max`, lowest score first, at most `limit`
    async fn zrangebyscore(
        &self,
        key: &str,
        min: ScoreBound,
        max: i64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Number of members in a sorted set
    async fn zcard(&self, key: &str) -> Result<u64, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Overwrite a string value, clearing any expiry
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Delete a key of any kind, returning whether it existed
    async fn del(&self, key: &str) -> Result<bool, StoreError>;

    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Expire a key after `ttl`, returning whether the key existed
    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError>;

    /// Atomically add `by` to an integer counter, returning the new value
    async fn incr_by(&self, key: &str, by: i64) -> Result<i64, StoreError>;

    /// Atomically subtract `by` from an integer counter
    async fn decr_by(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        self.incr_by(key, -by).await
    }
}
