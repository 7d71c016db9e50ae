// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job payloads as they are stored in queues.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

crate::define_id! {
    /// Opaque tracking token for one enqueued job.
    ///
    /// Supplied by the producer or generated at enqueue time. Used to key the
    /// status record and the PID marker of the job.
    pub struct JobId;
}

/// Immutable record pushed onto a queue by a producer.
///
/// `args` is persisted wrapped in a single-element outer array
/// (`"args": [[1, 2]]`), which every consumer of the key space expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPayload {
    pub class: String,
    #[serde(with = "wrapped_args", default)]
    pub args: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<JobId>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queue_time: Option<f64>,
}

impl JobPayload {
    /// Payload with only a class, as built by hand in tests and tools.
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            args: Vec::new(),
            id: None,
            prefix: String::new(),
            queue_time: None,
        }
    }

    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    pub fn with_id(mut self, id: impl Into<JobId>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// A deferred payload waiting in a `delayed:<timestamp>` bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelayedItem {
    pub queue: String,
    pub class: String,
    #[serde(with = "wrapped_args", default)]
    pub args: Vec<Value>,
}

/// Serde adapter for the `[[...args]]` wrapping.
///
/// Reading is lenient: a missing field, `[]` and `[null]` all mean no
/// arguments, and a non-array inner value is treated as a single argument.
mod wrapped_args {
    use super::*;

    pub fn serialize<S: Serializer>(args: &[Value], serializer: S) -> Result<S::Ok, S::Error> {
        [args].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
        let outer = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
        Ok(match outer.into_iter().next() {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(args)) => args,
            Some(other) => vec![other],
        })
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
