// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Named lifecycle hooks
//!
//! Listeners run synchronously, in registration order, on the task that
//! triggers the hook. A listener can veto the surrounding action by returning
//! [`HookError::DoNotCreate`] or [`HookError::DoNotPerform`]; these are policy
//! decisions, not failures. Any other error stops the remaining listeners and
//! is handed back to the caller.

use crate::error::JobError;
use parking_lot::RwLock;
use qw_core::{DelayedItem, JobId, JobPayload, WorkerId};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Lifecycle points that listeners can attach to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Hook {
    BeforeEnqueue,
    AfterEnqueue,
    BeforeDelayedEnqueue,
    BeforeFirstFork,
    BeforeFork,
    AfterFork,
    BeforePerform,
    AfterPerform,
    OnFailure,
}

impl Hook {
    pub fn name(self) -> &'static str {
        match self {
            Hook::BeforeEnqueue => "beforeEnqueue",
            Hook::AfterEnqueue => "afterEnqueue",
            Hook::BeforeDelayedEnqueue => "beforeDelayedEnqueue",
            Hook::BeforeFirstFork => "beforeFirstFork",
            Hook::BeforeFork => "beforeFork",
            Hook::AfterFork => "afterFork",
            Hook::BeforePerform => "beforePerform",
            Hook::AfterPerform => "afterPerform",
            Hook::OnFailure => "onFailure",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Borrowed view of a job, passed to listeners
#[derive(Debug, Clone, Copy)]
pub struct JobRef<'a> {
    pub queue: &'a str,
    pub payload: &'a JobPayload,
    pub worker: Option<&'a WorkerId>,
}

/// Arguments delivered with a hook
#[derive(Debug, Clone, Copy)]
pub enum Event<'a> {
    /// Around `create`, before the payload exists in the store
    Enqueue {
        queue: &'a str,
        class: &'a str,
        args: &'a [Value],
        id: &'a JobId,
    },
    /// A delayed item about to be promoted
    DelayedEnqueue(&'a DelayedItem),
    Job(JobRef<'a>),
    Worker(&'a WorkerId),
    Failure {
        job: JobRef<'a>,
        error: &'a JobError,
    },
}

/// Error a listener can raise
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HookError {
    /// Veto: abandon the enqueue without treating it as a failure
    #[error("job creation vetoed")]
    DoNotCreate,
    /// Veto: skip execution without treating it as a failure
    #[error("job execution vetoed")]
    DoNotPerform,
    #[error("{0}")]
    Failed(String),
}

impl HookError {
    pub fn failed(message: impl fmt::Display) -> Self {
        HookError::Failed(message.to_string())
    }

    pub fn is_veto(&self) -> bool {
        matches!(self, HookError::DoNotCreate | HookError::DoNotPerform)
    }
}

/// Registered handler; keep the returned handle to unregister it later
pub type Listener = Arc<dyn Fn(&Event<'_>) -> Result<(), HookError> + Send + Sync>;

/// Process-scoped listener registry, shared by clones
#[derive(Clone, Default)]
pub struct EventBus {
    listeners: Arc<RwLock<HashMap<Hook, Vec<Listener>>>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler after any already registered for `hook`
    pub fn listen<F>(&self, hook: Hook, handler: F) -> Listener
    where
        F: Fn(&Event<'_>) -> Result<(), HookError> + Send + Sync + 'static,
    {
        let listener: Listener = Arc::new(handler);
        self.listeners
            .write()
            .entry(hook)
            .or_default()
            .push(Arc::clone(&listener));
        listener
    }

    /// Remove exactly this handler. Returns whether it was registered.
    pub fn stop_listening(&self, hook: Hook, listener: &Listener) -> bool {
        let mut listeners = self.listeners.write();
        let Some(registered) = listeners.get_mut(&hook) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|l| !Arc::ptr_eq(l, listener));
        before != registered.len()
    }

    /// Run every handler for `hook` in order, stopping at the first error.
    pub fn trigger(&self, hook: Hook, event: &Event<'_>) -> Result<(), HookError> {
        // Snapshot so handlers may (un)register without deadlocking.
        let handlers: Vec<Listener> = match self.listeners.read().get(&hook) {
            Some(handlers) if !handlers.is_empty() => handlers.clone(),
            _ => return Ok(()),
        };
        tracing::trace!(hook = %hook, listeners = handlers.len(), "trigger");
        for handler in handlers {
            handler(event)?;
        }
        Ok(())
    }

    pub fn listener_count(&self, hook: Hook) -> usize {
        self.listeners.read().get(&hook).map_or(0, Vec::len)
    }

    /// Drop every handler for every hook
    pub fn clear_listeners(&self) {
        self.listeners.write().clear();
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read();
        let mut map = f.debug_map();
        for (hook, handlers) in listeners.iter() {
            map.entry(hook, &handlers.len());
        }
        map.finish()
    }
}

#[cfg(test)]
#[path = "event_bus_tests.rs"]
mod tests;
