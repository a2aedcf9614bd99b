//! Common test utilities for sqlbatch-rs integration tests.
//!
//! `ScriptedDispatcher` plays the remote backend. Each statement text can be
//! scripted to succeed, fail, hang until canceled, or wait for an explicit
//! release; unscripted statements succeed. Every call is recorded so tests can
//! check exactly what reached the backend and in which order.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use sqlbatch_rs::error::TransportError;
use sqlbatch_rs::query::ExecutableStatement;
use sqlbatch_rs::telemetry::Telemetry;
use sqlbatch_rs::transport::{ComputeContext, Dispatcher, NamespaceContext};
use sqlbatch_rs::ExecuteOptions;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// What the backend does with a statement.
#[derive(Debug, Clone)]
pub enum Step {
    /// Respond successfully
    Succeed,
    /// Reject with the given message
    Fail(&'static str),
    /// Never respond
    Hang,
    /// Respond successfully once `ScriptedDispatcher::release` is called
    WaitForRelease,
}

/// A dispatched statement as seen by the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatched {
    pub database: Option<String>,
    pub statement: String,
}

#[derive(Default)]
pub struct ScriptedDispatcher {
    script: HashMap<String, Step>,
    executed: Mutex<Vec<Dispatched>>,
    canceled: Mutex<Vec<String>>,
    release: Notify,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ScriptedDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(mut self, statement: &str, step: Step) -> Self {
        self.script.insert(statement.to_string(), step);
        self
    }

    /// Let one `WaitForRelease` statement complete.
    pub fn release(&self) {
        self.release.notify_one();
    }

    /// Statement texts in dispatch order.
    pub fn executed(&self) -> Vec<String> {
        self.dispatched()
            .into_iter()
            .map(|dispatched| dispatched.statement)
            .collect()
    }

    pub fn dispatched(&self) -> Vec<Dispatched> {
        self.executed.lock().unwrap().clone()
    }

    /// Yield until at least `count` statements have reached the backend.
    pub async fn wait_for_executed(&self, count: usize) {
        while self.executed.lock().unwrap().len() < count {
            tokio::task::yield_now().await;
        }
    }

    /// Highest number of executions the backend saw at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Statement texts the backend was asked to cancel.
    pub fn canceled(&self) -> Vec<String> {
        self.canceled.lock().unwrap().clone()
    }
}

#[async_trait]
impl Dispatcher for ScriptedDispatcher {
    async fn execute(&self, executable: &ExecutableStatement) -> Result<Value, TransportError> {
        self.executed.lock().unwrap().push(Dispatched {
            database: executable.database(),
            statement: executable.statement().to_string(),
        });

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let _in_flight = InFlight(&self.in_flight);
        tokio::task::yield_now().await;

        let step = self
            .script
            .get(executable.statement())
            .cloned()
            .unwrap_or(Step::Succeed);

        match step {
            Step::Succeed => Ok(json!({ "status": "ok" })),
            Step::Fail(message) => Err(TransportError::Rejected(message.to_string())),
            Step::Hang => std::future::pending().await,
            Step::WaitForRelease => {
                self.release.notified().await;
                Ok(json!({ "status": "ok" }))
            }
        }
    }

    async fn cancel(&self, executable: &ExecutableStatement) -> Result<(), TransportError> {
        self.canceled
            .lock()
            .unwrap()
            .push(executable.statement().to_string());
        Ok(())
    }
}

/// Telemetry sink that keeps every event.
#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<(String, String)>>,
}

impl RecordingTelemetry {
    pub fn events(&self) -> Vec<(String, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|(_, action)| action)
            .collect()
    }
}

impl Telemetry for RecordingTelemetry {
    fn log(&self, category: &str, action: &str) {
        self.events
            .lock()
            .unwrap()
            .push((category.to_string(), action.to_string()));
    }
}

/// Options for a Hive batch starting in the `default` database.
pub fn hive_options(statements: &str) -> ExecuteOptions {
    ExecuteOptions::builder()
        .statements(statements)
        .source_type("hive")
        .compute(ComputeContext::new("compute-1", "default", "direct"))
        .namespace(NamespaceContext::new("namespace-1", "default"))
        .database("default")
        .build()
        .expect("valid options")
}

/// Convenience for building dispatchers shared between a test and an executor.
pub fn shared(dispatcher: ScriptedDispatcher) -> Arc<ScriptedDispatcher> {
    Arc::new(dispatcher)
}
