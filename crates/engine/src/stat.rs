// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named counters under `stat:<name>`

use qw_adapters::{Store, StoreError};
use qw_core::keys;

#[derive(Clone)]
pub struct Stat<S> {
    store: S,
}

impl<S: Store> Stat<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Current value; missing or unparsable counters read as zero
    pub async fn get(&self, name: &str) -> Result<i64, StoreError> {
        let value = self.store.get(&keys::stat(name)).await?;
        Ok(value.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    pub async fn incr(&self, name: &str, by: i64) -> Result<i64, StoreError> {
        self.store.incr_by(&keys::stat(name), by).await
    }

    pub async fn decr(&self, name: &str, by: i64) -> Result<i64, StoreError> {
        self.store.decr_by(&keys::stat(name), by).await
    }

    /// Delete the counter. Returns whether it existed.
    pub async fn clear(&self, name: &str) -> Result<bool, StoreError> {
        self.store.del(&keys::stat(name)).await
    }
}

#[cfg(test)]
#[path = "stat_tests.rs"]
mod tests;
