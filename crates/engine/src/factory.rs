// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolving a job class name to something that can run

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors resolving a job class
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FactoryError {
    #[error("could not find job class {0}")]
    NotFound(String),
    #[error("job class {class} cannot be performed: {reason}")]
    NotExecutable { class: String, reason: String },
}

/// Error returned by job code
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PerformError {
    /// Skip this job; recorded as neither success nor failure
    #[error("job declined to perform")]
    DoNotPerform,
    #[error("{0}")]
    Failed(String),
}

impl PerformError {
    pub fn failed(message: impl fmt::Display) -> Self {
        PerformError::Failed(message.to_string())
    }
}

/// An executable job instance.
///
/// `set_up` and `tear_down` run around `perform` when a job needs them;
/// either of the first two may return [`PerformError::DoNotPerform`].
#[async_trait]
pub trait Perform: Send + Sync {
    async fn set_up(&mut self) -> Result<(), PerformError> {
        Ok(())
    }

    /// Run the job; the value is stored as the status result
    async fn perform(&mut self) -> Result<Value, PerformError>;

    async fn tear_down(&mut self) -> Result<(), PerformError> {
        Ok(())
    }
}

/// What a constructor is given
#[derive(Debug, Clone, PartialEq)]
pub struct JobArgs {
    pub class: String,
    pub args: Vec<Value>,
    pub queue: String,
}

/// Builds executable instances from a class name
pub trait JobFactory: Send + Sync {
    fn create(
        &self,
        class: &str,
        args: &[Value],
        queue: &str,
    ) -> Result<Box<dyn Perform>, FactoryError>;
}

type Constructor = Arc<dyn Fn(JobArgs) -> Result<Box<dyn Perform>, FactoryError> + Send + Sync>;

/// Factory backed by a table of named constructors
#[derive(Clone, Default)]
pub struct Registry {
    constructors: Arc<RwLock<HashMap<String, Constructor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an infallible constructor for `class`
    pub fn register<F, P>(&self, class: impl Into<String>, build: F) -> &Self
    where
        F: Fn(JobArgs) -> P + Send + Sync + 'static,
        P: Perform + 'static,
    {
        self.register_fallible(class, move |args| Ok(Box::new(build(args)) as Box<dyn Perform>))
    }

    /// Register a constructor that may reject its arguments with
    /// [`FactoryError::NotExecutable`]
    pub fn register_fallible<F>(&self, class: impl Into<String>, build: F) -> &Self
    where
        F: Fn(JobArgs) -> Result<Box<dyn Perform>, FactoryError> + Send + Sync + 'static,
    {
        self.constructors.write().insert(class.into(), Arc::new(build));
        self
    }

    pub fn contains(&self, class: &str) -> bool {
        self.constructors.read().contains_key(class)
    }

    pub fn classes(&self) -> Vec<String> {
        let mut classes: Vec<String> = self.constructors.read().keys().cloned().collect();
        classes.sort();
        classes
    }
}

impl JobFactory for Registry {
    fn create(
        &self,
        class: &str,
        args: &[Value],
        queue: &str,
    ) -> Result<Box<dyn Perform>, FactoryError> {
        let build = self
            .constructors
            .read()
            .get(class)
            .cloned()
            .ok_or_else(|| FactoryError::NotFound(class.to_string()))?;
        build(JobArgs {
            class: class.to_string(),
            args: args.to_vec(),
            queue: queue.to_string(),
        })
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("classes", &self.classes())
            .finish()
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
