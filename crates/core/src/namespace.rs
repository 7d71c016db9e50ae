// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store key namespacing and the [`Namespace`] newtype.

/// Prefix applied by a store to every key it touches.
///
/// Several deployments can share one keyed store by using different
/// namespaces. An empty `Namespace` leaves keys untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Namespace(String);

impl Namespace {
    /// Create a namespace, dropping any trailing `:` so `"resque"` and
    /// `"resque:"` are equivalent.
    pub fn new(s: impl Into<String>) -> Self {
        let mut s = s.into();
        while s.ends_with(':') {
            s.pop();
        }
        Self(s)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Apply the namespace to a relative key.
    pub fn key(&self, key: &str) -> String {
        scoped_key(&self.0, key)
    }

    /// Strip the namespace from a fully qualified key.
    pub fn strip<'a>(&self, key: &'a str) -> &'a str {
        split_scoped_key(&self.0, key)
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for Namespace {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Namespace {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Build a namespaced key: `"{namespace}:{key}"`, or the bare key when the
/// namespace is empty.
pub fn scoped_key(namespace: &str, key: &str) -> String {
    if namespace.is_empty() {
        key.to_string()
    } else {
        format!("{}:{}", namespace, key)
    }
}

/// Inverse of [`scoped_key`]. Keys outside the namespace are returned as-is.
pub fn split_scoped_key<'a>(namespace: &str, key: &'a str) -> &'a str {
    if namespace.is_empty() {
        return key;
    }
    key.strip_prefix(namespace)
        .and_then(|rest| rest.strip_prefix(':'))
        .unwrap_or(key)
}

#[cfg(test)]
#[path = "namespace_tests.rs"]
mod tests;
