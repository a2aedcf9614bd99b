//! Executable statements.
//!
//! An `ExecutableStatement` is one statement bound to the context it runs in.
//! It owns at most one in-flight `CancellableOperation` and tracks its own
//! `ExecutionStatus`.

use crate::config::ExecutorConfig;
use crate::error::{ConfigError, QueryError};
use crate::query::operation::CancellableOperation;
use crate::query::status::ExecutionStatus;
use crate::telemetry::{cancel_action, execute_action, Telemetry, TracingTelemetry};
use crate::transport::{ComputeContext, Dispatcher, NamespaceContext};
use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tokio::time::timeout;
use tracing::{debug, warn};

#[derive(Default)]
struct ExecutionState {
    database: Option<String>,
    operation: Option<CancellableOperation>,
    response: Option<Value>,
    error: Option<QueryError>,
}

/// A single statement and the context it executes in.
///
/// Statements are created behind an `Arc` because the in-flight operation
/// refers back to the statement it is executing.
pub struct ExecutableStatement {
    source_type: String,
    compute: ComputeContext,
    namespace: NamespaceContext,
    statement: String,
    status: watch::Sender<ExecutionStatus>,
    // Operation handle, database and outcome change together with `status`
    // and are only touched while this lock is held.
    state: Mutex<ExecutionState>,
    dispatcher: Arc<dyn Dispatcher>,
    telemetry: Arc<dyn Telemetry>,
    config: Arc<ExecutorConfig>,
}

impl ExecutableStatement {
    /// Create a new `ExecutableStatementBuilder`.
    pub fn builder(dispatcher: Arc<dyn Dispatcher>) -> ExecutableStatementBuilder {
        ExecutableStatementBuilder::new(dispatcher)
    }

    /// Get the source type.
    pub fn source_type(&self) -> &str {
        &self.source_type
    }

    /// Get the compute context.
    pub fn compute(&self) -> &ComputeContext {
        &self.compute
    }

    /// Get the namespace context.
    pub fn namespace(&self) -> &NamespaceContext {
        &self.namespace
    }

    /// Get the database the statement runs against.
    pub fn database(&self) -> Option<String> {
        self.lock_state().database.clone()
    }

    /// Change the database before execution.
    ///
    /// # Errors
    /// Returns `QueryError::InvalidState` once execution has started.
    pub fn set_database(&self, database: Option<String>) -> Result<(), QueryError> {
        let mut state = self.lock_state();
        let status = self.status();
        if status != ExecutionStatus::Ready {
            return Err(QueryError::InvalidState(format!(
                "cannot change database of a {} statement",
                status
            )));
        }
        state.database = database;
        Ok(())
    }

    /// Get the statement text.
    pub fn statement(&self) -> &str {
        &self.statement
    }

    /// Get the current status.
    pub fn status(&self) -> ExecutionStatus {
        *self.status.borrow()
    }

    /// Subscribe to status changes.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionStatus> {
        self.status.subscribe()
    }

    /// Check if an operation is in flight.
    pub fn has_active_operation(&self) -> bool {
        self.lock_state().operation.is_some()
    }

    /// Response recorded by a successful dispatch.
    pub fn response(&self) -> Option<Value> {
        self.lock_state().response.clone()
    }

    /// Error recorded by a failed dispatch.
    pub fn error(&self) -> Option<QueryError> {
        self.lock_state().error.clone()
    }

    /// Start executing the statement.
    ///
    /// Only a `Ready` statement starts; for any other status, including a
    /// repeated call while running, this is a no-op returning `None`.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn execute(self: &Arc<Self>) -> Option<CancellableOperation> {
        let mut state = self.lock_state();
        if !self.transition(ExecutionStatus::Ready, ExecutionStatus::Running) {
            debug!(
                status = %self.status(),
                "ignoring execute for statement that is not ready"
            );
            return None;
        }

        self.telemetry.log(
            &self.config.telemetry_category,
            &execute_action(&self.source_type),
        );

        let unit = Arc::clone(self);
        let work = async move { unit.dispatch().await };
        let unit = Arc::clone(self);
        let on_cancel = async move { unit.cancel_remote().await };

        let operation = CancellableOperation::spawn(work, on_cancel);
        state.operation = Some(operation.clone());
        Some(operation)
    }

    /// Cancel the statement if it is running.
    ///
    /// The status moves to `Canceling` before this returns. The returned future
    /// completes once the in-flight operation has settled, at which point the
    /// status is `Canceled`. For a statement that is not running this is a
    /// no-op and the future completes immediately.
    pub fn cancel(self: &Arc<Self>) -> impl Future<Output = ()> + Send + 'static {
        let operation = {
            let state = self.lock_state();
            match state.operation.clone() {
                Some(operation)
                    if self.transition(ExecutionStatus::Running, ExecutionStatus::Canceling) =>
                {
                    Some(operation)
                }
                _ => None,
            }
        };

        if let Some(operation) = &operation {
            self.telemetry.log(
                &self.config.telemetry_category,
                &cancel_action(&self.source_type),
            );
            operation.request_cancel();
        }

        let unit = Arc::clone(self);
        async move {
            let Some(operation) = operation else {
                return;
            };
            let outcome = operation.settled().await;
            debug!(?outcome, "statement operation settled after cancel");

            let mut state = unit.lock_state();
            unit.transition(ExecutionStatus::Canceling, ExecutionStatus::Canceled);
            state.operation = None;
        }
    }

    async fn dispatch(&self) -> Result<(), QueryError> {
        let result = match self.config.statement_timeout {
            Some(limit) => match timeout(limit, self.dispatcher.execute(self)).await {
                Ok(result) => result.map_err(QueryError::from),
                Err(_) => {
                    // The remote query is still running
                    self.cancel_remote().await;
                    Err(QueryError::Timeout {
                        timeout_ms: limit.as_millis() as u64,
                    })
                }
            },
            None => self.dispatcher.execute(self).await.map_err(QueryError::from),
        };

        let mut state = self.lock_state();
        match result {
            Ok(response) => {
                state.response = Some(response);
                if self.transition(ExecutionStatus::Running, ExecutionStatus::Success) {
                    state.operation = None;
                }
                Ok(())
            }
            Err(e) => {
                warn!(source_type = %self.source_type, error = %e, "statement execution failed");
                state.error = Some(e.clone());
                // A pending cancel owns the final status
                if self.transition(ExecutionStatus::Running, ExecutionStatus::Failed) {
                    state.operation = None;
                }
                Err(e)
            }
        }
    }

    async fn cancel_remote(&self) {
        if let Err(e) = self.dispatcher.cancel(self).await {
            warn!(source_type = %self.source_type, error = %e, "remote cancel failed");
        }
    }

    fn transition(&self, from: ExecutionStatus, to: ExecutionStatus) -> bool {
        debug_assert!(from.can_transition_to(to));
        let changed = self.status.send_if_modified(|status| {
            if *status == from {
                *status = to;
                true
            } else {
                false
            }
        });
        if changed {
            debug!(source_type = %self.source_type, %from, %to, "statement status changed");
        }
        changed
    }

    fn lock_state(&self) -> MutexGuard<'_, ExecutionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for ExecutableStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutableStatement")
            .field("source_type", &self.source_type)
            .field("compute", &self.compute)
            .field("namespace", &self.namespace)
            .field("database", &self.database())
            .field("statement", &self.statement)
            .field("status", &self.status())
            .finish()
    }
}

/// Builder for creating `ExecutableStatement` instances with a fluent API.
pub struct ExecutableStatementBuilder {
    dispatcher: Arc<dyn Dispatcher>,
    telemetry: Arc<dyn Telemetry>,
    config: Arc<ExecutorConfig>,
    source_type: Option<String>,
    compute: ComputeContext,
    namespace: NamespaceContext,
    database: Option<String>,
    statement: Option<String>,
}

impl ExecutableStatementBuilder {
    /// Create a new builder dispatching through `dispatcher`.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            dispatcher,
            telemetry: Arc::new(TracingTelemetry),
            config: Arc::new(ExecutorConfig::default()),
            source_type: None,
            compute: ComputeContext::default(),
            namespace: NamespaceContext::default(),
            database: None,
            statement: None,
        }
    }

    /// Set the telemetry sink.
    pub fn telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Set the executor configuration.
    pub fn config(mut self, config: Arc<ExecutorConfig>) -> Self {
        self.config = config;
        self
    }

    /// Set the source type.
    pub fn source_type(mut self, source_type: impl Into<String>) -> Self {
        self.source_type = Some(source_type.into());
        self
    }

    /// Set the compute context.
    pub fn compute(mut self, compute: ComputeContext) -> Self {
        self.compute = compute;
        self
    }

    /// Set the namespace context.
    pub fn namespace(mut self, namespace: NamespaceContext) -> Self {
        self.namespace = namespace;
        self
    }

    /// Set the database.
    pub fn database(mut self, database: Option<String>) -> Self {
        self.database = database;
        self
    }

    /// Set the statement text.
    pub fn statement(mut self, statement: impl Into<String>) -> Self {
        self.statement = Some(statement.into());
        self
    }

    /// Build the statement.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingField` if the source type or statement
    /// text was not set.
    pub fn build(self) -> Result<Arc<ExecutableStatement>, ConfigError> {
        let source_type = self
            .source_type
            .ok_or(ConfigError::MissingField("source_type"))?;
        let statement = self
            .statement
            .ok_or(ConfigError::MissingField("statement"))?;
        let (status, _) = watch::channel(ExecutionStatus::Ready);

        Ok(Arc::new(ExecutableStatement {
            source_type,
            compute: self.compute,
            namespace: self.namespace,
            statement,
            status,
            state: Mutex::new(ExecutionState {
                database: self.database,
                ..ExecutionState::default()
            }),
            dispatcher: self.dispatcher,
            telemetry: self.telemetry,
            config: self.config,
        }))
    }
}
