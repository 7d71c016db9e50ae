// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced adapter wrappers for consistent observability

use crate::store::{ScoreBound, Store, StoreError};
use async_trait::async_trait;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// Wrapper that adds tracing to any Store
///
/// Every call runs inside a `store.<op>` span. Failures are logged at error
/// level and calls slower than the configured threshold at warn level.
#[derive(Clone)]
pub struct TracedStore<S> {
    inner: S,
    slow: Duration,
}

impl<S> TracedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            slow: crate::env::slow_store_threshold(),
        }
    }

    pub fn with_slow_threshold(mut self, slow: Duration) -> Self {
        self.slow = slow;
        self
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: Store> TracedStore<S> {
    async fn observe<T, F>(&self, span: tracing::Span, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let slow = self.slow;
        async move {
            let start = Instant::now();
            let result = call.await;
            let elapsed_ms = start.elapsed().as_millis() as u64;
            match &result {
                Err(e) if e.is_transient() => {
                    tracing::warn!(elapsed_ms, error = %e, "store unreachable")
                }
                Err(e) => tracing::error!(elapsed_ms, error = %e, "store call failed"),
                Ok(_) if start.elapsed() >= slow => {
                    tracing::warn!(elapsed_ms, "slow store call")
                }
                Ok(_) => tracing::trace!(elapsed_ms, "ok"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl<S: Store> Store for TracedStore<S> {
    async fn ping(&self) -> Result<(), StoreError> {
        self.observe(tracing::debug_span!("store.ping"), self.inner.ping())
            .await
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let span = tracing::debug_span!("store.rpush", key, value_len = value.len());
        self.observe(span, self.inner.rpush(key, value)).await
    }

    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.observe(tracing::debug_span!("store.lpop", key), self.inner.lpop(key))
            .await
    }

    async fn blpop(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, String)>, StoreError> {
        // Waiting is the point of this call; only failures are interesting.
        let result = self.inner.blpop(keys, timeout).await;
        match &result {
            Ok(Some((key, _))) => tracing::debug!(key, "blpop popped"),
            Ok(None) => tracing::trace!(keys = keys.len(), timeout_ms = timeout.as_millis() as u64, "blpop timed out"),
            Err(e) => tracing::warn!(error = %e, "blpop failed"),
        }
        result
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        self.observe(tracing::trace_span!("store.llen", key), self.inner.llen(key))
            .await
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let span = tracing::trace_span!("store.lrange", key, start, stop);
        self.observe(span, self.inner.lrange(key, start, stop)).await
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.sadd", key, member);
        self.observe(span, self.inner.sadd(key, member)).await
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.srem", key, member);
        self.observe(span, self.inner.srem(key, member)).await
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        self.observe(
            tracing::trace_span!("store.smembers", key),
            self.inner.smembers(key),
        )
        .await
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let span = tracing::trace_span!("store.sismember", key, member);
        self.observe(span, self.inner.sismember(key, member)).await
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        let span = tracing::debug_span!("store.zadd", key, score, member);
        self.observe(span, self.inner.zadd(key, score, member)).await
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.zrem", key, member);
        self.observe(span, self.inner.zrem(key, member)).await
    }

    async fn zrangebyscore(
        &self,
        key: &str,
        min: ScoreBound,
        max: i64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let span = tracing::trace_span!("store.zrangebyscore", key, ?min, max, limit);
        self.observe(span, self.inner.zrangebyscore(key, min, max, limit))
            .await
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        self.observe(tracing::trace_span!("store.zcard", key), self.inner.zcard(key))
            .await
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.observe(tracing::trace_span!("store.get", key), self.inner.get(key))
            .await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let span = tracing::debug_span!("store.set", key, value_len = value.len());
        self.observe(span, self.inner.set(key, value)).await
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        self.observe(tracing::debug_span!("store.del", key), self.inner.del(key))
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.observe(tracing::trace_span!("store.exists", key), self.inner.exists(key))
            .await
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let span = tracing::debug_span!("store.expire", key, ttl_secs = ttl.as_secs());
        self.observe(span, self.inner.expire(key, ttl)).await
    }

    async fn incr_by(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let span = tracing::debug_span!("store.incr_by", key, by);
        self.observe(span, self.inner.incr_by(key, by)).await
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;
