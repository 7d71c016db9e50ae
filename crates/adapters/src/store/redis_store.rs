// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Redis-backed store

use super::{ScoreBound, Store, StoreError};
use async_trait::async_trait;
use qw_core::Namespace;
use redis::aio::MultiplexedConnection;
use std::sync::Arc;
use std::time::Duration;

/// Strip credentials and path from a DSN for log lines.
pub fn summarize_redis_dsn(dsn: &str) -> String {
    let (scheme, rest) = dsn.split_once("://").unwrap_or(("", dsn));
    let without_auth = rest.rsplit('@').next().unwrap_or(rest);
    let host = without_auth
        .split(['/', '?', '#'])
        .next()
        .unwrap_or(without_auth);

    if scheme.is_empty() {
        host.to_string()
    } else if host.is_empty() {
        format!("{scheme}://")
    } else {
        format!("{scheme}://{host}")
    }
}

fn map_err(err: redis::RedisError) -> StoreError {
    if err.is_io_error()
        || err.is_connection_dropped()
        || err.is_connection_refusal()
        || err.is_timeout()
    {
        StoreError::Unavailable(err.to_string())
    } else if err.kind() == redis::ErrorKind::TypeError
        || err.to_string().contains("WRONGTYPE")
    {
        StoreError::WrongType(err.to_string())
    } else {
        StoreError::Command(err.to_string())
    }
}

/// Store backed by a Redis server.
///
/// Keys are prefixed with the namespace. Blocking pops run on a dedicated
/// connection so they never stall other commands.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    blocking: Arc<tokio::sync::Mutex<MultiplexedConnection>>,
    namespace: Namespace,
    dsn: String,
}

impl RedisStore {
    pub async fn connect(dsn: &str, namespace: Namespace) -> Result<Self, StoreError> {
        let client = redis::Client::open(dsn).map_err(|e| {
            StoreError::Unavailable(format!("invalid redis dsn {}: {e}", summarize_redis_dsn(dsn)))
        })?;
        let conn = client.get_multiplexed_async_connection().await.map_err(|e| {
            StoreError::Unavailable(format!(
                "failed to connect to redis ({}): {e}",
                summarize_redis_dsn(dsn)
            ))
        })?;
        let blocking = client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_err)?;
        tracing::info!(dsn = %summarize_redis_dsn(dsn), namespace = namespace.as_str(), "connected to redis");
        Ok(Self {
            conn,
            blocking: Arc::new(tokio::sync::Mutex::new(blocking)),
            namespace,
            dsn: dsn.to_string(),
        })
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// DSN this store was opened with, credentials included
    pub fn dsn(&self) -> &str {
        &self.dsn
    }

    fn key(&self, key: &str) -> String {
        self.namespace.key(key)
    }
}

#[async_trait]
impl Store for RedisStore {
    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _pong: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn rpush(&self, key: &str, value: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let len: u64 = redis::cmd("RPUSH")
            .arg(self.key(key))
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(len)
    }

    async fn lpop(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("LPOP")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(value)
    }

    async fn blpop(
        &self,
        keys: &[String],
        timeout: Duration,
    ) -> Result<Option<(String, String)>, StoreError> {
        if keys.is_empty() {
            return Ok(None);
        }
        if timeout.is_zero() {
            // BLPOP 0 would block forever
            for key in keys {
                if let Some(value) = self.lpop(key).await? {
                    return Ok(Some((key.clone(), value)));
                }
            }
            return Ok(None);
        }

        let mut cmd = redis::cmd("BLPOP");
        for key in keys {
            cmd.arg(self.key(key));
        }
        cmd.arg(timeout.as_secs_f64());

        let mut conn = self.blocking.lock().await;
        let popped: Option<(String, String)> =
            cmd.query_async(&mut *conn).await.map_err(map_err)?;
        Ok(popped.map(|(key, value)| (self.namespace.strip(&key).to_string(), value)))
    }

    async fn llen(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let len: u64 = redis::cmd("LLEN")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(len)
    }

    async fn lrange(&self, key: &str, start: i64, stop: i64) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let items: Vec<String> = redis::cmd("LRANGE")
            .arg(self.key(key))
            .arg(start)
            .arg(stop)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(items)
    }

    async fn sadd(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let added: i64 = redis::cmd("SADD")
            .arg(self.key(key))
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(added > 0)
    }

    async fn srem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("SREM")
            .arg(self.key(key))
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(removed > 0)
    }

    async fn smembers(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let mut conn = self.conn.clone();
        let mut members: Vec<String> = redis::cmd("SMEMBERS")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        members.sort();
        Ok(members)
    }

    async fn sismember(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let found: i64 = redis::cmd("SISMEMBER")
            .arg(self.key(key))
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(found == 1)
    }

    async fn zadd(&self, key: &str, score: i64, member: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _added: i64 = redis::cmd("ZADD")
            .arg(self.key(key))
            .arg(score)
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn zrem(&self, key: &str, member: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("ZREM")
            .arg(self.key(key))
            .arg(member)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(removed > 0)
    }

    async fn zrangebyscore(
        &self,
        key: &str,
        min: ScoreBound,
        max: i64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let min = match min {
            ScoreBound::NegInfinity => "-inf".to_string(),
            ScoreBound::Inclusive(score) => score.to_string(),
        };
        let mut conn = self.conn.clone();
        let members: Vec<String> = redis::cmd("ZRANGEBYSCORE")
            .arg(self.key(key))
            .arg(min)
            .arg(max)
            .arg("LIMIT")
            .arg(0)
            .arg(limit)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(members)
    }

    async fn zcard(&self, key: &str) -> Result<u64, StoreError> {
        let mut conn = self.conn.clone();
        let count: u64 = redis::cmd("ZCARD")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(count)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.conn.clone();
        let _ok: String = redis::cmd("SET")
            .arg(self.key(key))
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let removed: i64 = redis::cmd("DEL")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(removed > 0)
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let found: i64 = redis::cmd("EXISTS")
            .arg(self.key(key))
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(found > 0)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> Result<bool, StoreError> {
        let mut conn = self.conn.clone();
        let set: i64 = redis::cmd("EXPIRE")
            .arg(self.key(key))
            .arg(ttl.as_secs())
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(set == 1)
    }

    async fn incr_by(&self, key: &str, by: i64) -> Result<i64, StoreError> {
        let mut conn = self.conn.clone();
        let value: i64 = redis::cmd("INCRBY")
            .arg(self.key(key))
            .arg(by)
            .query_async(&mut conn)
            .await
            .map_err(map_err)?;
        Ok(value)
    }
}

#[cfg(test)]
#[path = "redis_store_tests.rs"]
mod tests;
