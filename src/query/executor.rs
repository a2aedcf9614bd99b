//! Batch execution.
//!
//! The `Executor` turns raw editor text into an ordered list of
//! `ExecutableStatement`s and runs them strictly one after another. `USE`
//! directives are applied while splitting and never reach the backend.
//!
//! A batch stops at the first failing statement. Canceling a batch cancels the
//! statement in flight; statements that never started stay `Ready`.

use crate::config::{ExecuteOptions, ExecutorConfig};
use crate::error::{ConfigError, QueryError};
use crate::query::directive::Directive;
use crate::query::operation::{CancellableOperation, OperationState};
use crate::query::splitter::{SqlStatementSplitter, StatementSplitter};
use crate::query::statement::ExecutableStatement;
use crate::query::status::ExecutionStatus;
use crate::telemetry::{Telemetry, TracingTelemetry};
use crate::transport::Dispatcher;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info};

/// Final outcome of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Every statement succeeded
    Succeeded,
    /// A statement failed and the batch stopped there
    Failed {
        /// Position of the failing statement in the batch
        statement_index: usize,
        /// Error reported for it
        error: QueryError,
    },
    /// The batch was canceled
    Canceled,
}

struct Batch {
    executables: Vec<Arc<ExecutableStatement>>,
    status: watch::Sender<ExecutionStatus>,
    failure: OnceLock<(usize, QueryError)>,
    // Held while starting a statement or starting a cancel, so a cancel
    // either sees the launched statement or stops the launch.
    launching: Mutex<()>,
}

impl Batch {
    fn new(executables: Vec<Arc<ExecutableStatement>>) -> Self {
        let (status, _) = watch::channel(ExecutionStatus::Running);
        Self {
            executables,
            status,
            failure: OnceLock::new(),
            launching: Mutex::new(()),
        }
    }

    fn lock_launching(&self) -> MutexGuard<'_, ()> {
        self.launching.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn status(&self) -> ExecutionStatus {
        *self.status.borrow()
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
            debug!(%from, %to, "batch status changed");
        }
        changed
    }

    fn fail(&self, index: usize, error: QueryError) {
        let _ = self.failure.set((index, error));
        if self.transition(ExecutionStatus::Running, ExecutionStatus::Failed) {
            info!(statement_index = index, "batch failed");
        }
    }

    fn finish_cancel(&self) {
        if self.transition(ExecutionStatus::Canceling, ExecutionStatus::Canceled) {
            info!("batch canceled");
        }
    }

    /// Finish a batch whose running statement was canceled directly rather
    /// than through `BatchHandle::cancel`.
    async fn adopt_cancel(&self, executable: &ExecutableStatement) {
        if !self.transition(ExecutionStatus::Running, ExecutionStatus::Canceling) {
            return;
        }
        let mut status = executable.subscribe();
        let _ = status.wait_for(|s| s.is_terminal()).await;
        self.finish_cancel();
    }

    /// Start the statement at `index` if the batch is still running.
    fn launch(&self, index: usize) -> Option<CancellableOperation> {
        let executable = self.executables.get(index)?;
        let _launching = self.lock_launching();
        if self.status() != ExecutionStatus::Running {
            debug!(
                remaining = self.executables.len() - index,
                "batch no longer running, abandoning remaining statements"
            );
            return None;
        }

        let operation = executable.execute();
        if operation.is_none() {
            self.fail(
                index,
                QueryError::InvalidState(format!(
                    "statement is {}, expected ready",
                    executable.status()
                )),
            );
        }
        operation
    }

    /// Drive the batch from the already started statement 0 to the end.
    async fn run(self: Arc<Self>, first: CancellableOperation) {
        let mut operation = first;

        for (index, executable) in self.executables.iter().enumerate() {
            match operation.settled().await {
                OperationState::Resolved if executable.status() == ExecutionStatus::Success => {}
                OperationState::Rejected(error) if !canceled(executable) => {
                    self.fail(index, error);
                    return;
                }
                // Settled after a cancel already claimed the statement
                _ => {
                    self.adopt_cancel(executable).await;
                    return;
                }
            }

            if index + 1 == self.executables.len() {
                break;
            }
            operation = match self.launch(index + 1) {
                Some(next) => next,
                None => return,
            };
        }

        if self.transition(ExecutionStatus::Running, ExecutionStatus::Success) {
            info!(statements = self.executables.len(), "batch succeeded");
        }
    }
}

fn canceled(executable: &ExecutableStatement) -> bool {
    matches!(
        executable.status(),
        ExecutionStatus::Canceling | ExecutionStatus::Canceled
    )
}

/// Handle to a running batch.
///
/// Bundles the batch outcome with the single cancel operation for the whole
/// batch. Handles are cheap to clone.
#[derive(Clone)]
pub struct BatchHandle {
    batch: Arc<Batch>,
}

impl BatchHandle {
    /// Get the current batch status.
    pub fn status(&self) -> ExecutionStatus {
        self.batch.status()
    }

    /// Subscribe to batch status changes.
    pub fn subscribe(&self) -> watch::Receiver<ExecutionStatus> {
        self.batch.status.subscribe()
    }

    /// Snapshot of the statements in this batch, in execution order.
    pub fn executables(&self) -> Vec<Arc<ExecutableStatement>> {
        self.batch.executables.clone()
    }

    /// Cancel the batch.
    ///
    /// A running batch moves to `Canceling` before this returns and no further
    /// statement is started. The returned future completes once the statement
    /// in flight, if any, has settled and the batch is `Canceled`. For a
    /// finished batch this is a no-op and the future completes immediately.
    pub fn cancel(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut cancels = Vec::new();
        // Statements already canceled directly, finished by their own cancel
        let mut canceling = Vec::new();

        let started = {
            let _launching = self.batch.lock_launching();
            let started = self
                .batch
                .transition(ExecutionStatus::Running, ExecutionStatus::Canceling);
            if started {
                for executable in &self.batch.executables {
                    match executable.status() {
                        ExecutionStatus::Running => cancels.push(executable.cancel()),
                        ExecutionStatus::Canceling => canceling.push(executable.subscribe()),
                        _ => {}
                    }
                }
            }
            started
        };

        let batch = Arc::clone(&self.batch);
        if started && cancels.is_empty() && canceling.is_empty() {
            // Between two statements; nothing to wait for
            batch.finish_cancel();
        }

        async move {
            if !started {
                return;
            }
            for cancel in cancels {
                cancel.await;
            }
            for mut status in canceling {
                let _ = status.wait_for(|s| s.is_terminal()).await;
            }
            batch.finish_cancel();
        }
    }

    /// Wait for the batch to reach a terminal status.
    pub async fn wait(&self) -> BatchOutcome {
        let mut status = self.batch.status.subscribe();
        // The handle keeps the sender alive, so the channel cannot close here.
        let terminal = status
            .wait_for(|s| s.is_terminal())
            .await
            .map(|s| *s)
            .unwrap_or(ExecutionStatus::Failed);

        match terminal {
            ExecutionStatus::Success => BatchOutcome::Succeeded,
            ExecutionStatus::Canceled => BatchOutcome::Canceled,
            _ => {
                let (statement_index, error) = self.batch.failure.get().cloned().unwrap_or((
                    0,
                    QueryError::InvalidState("batch failed without an error".to_string()),
                ));
                BatchOutcome::Failed {
                    statement_index,
                    error,
                }
            }
        }
    }
}

/// Splits statement text into executables and runs them as a batch.
pub struct Executor {
    dispatcher: Arc<dyn Dispatcher>,
    splitter: Arc<dyn StatementSplitter>,
    telemetry: Arc<dyn Telemetry>,
    config: Arc<ExecutorConfig>,
    last_batch: Mutex<Option<BatchHandle>>,
}

impl Executor {
    /// Create an executor with the default splitter, telemetry and config.
    pub fn new(dispatcher: Arc<dyn Dispatcher>) -> Self {
        Self {
            dispatcher,
            splitter: Arc::new(SqlStatementSplitter),
            telemetry: Arc::new(TracingTelemetry),
            config: Arc::new(ExecutorConfig::default()),
            last_batch: Mutex::new(None),
        }
    }

    /// Use `splitter` to split statement text.
    pub fn with_splitter(mut self, splitter: Arc<dyn StatementSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    /// Send usage events to `telemetry`.
    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = telemetry;
        self
    }

    /// Use `config` for all statements.
    pub fn with_config(mut self, config: ExecutorConfig) -> Self {
        self.config = Arc::new(config);
        self
    }

    /// Get the executor configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Status of the most recent batch, or `Ready` if none was started.
    pub fn status(&self) -> ExecutionStatus {
        self.last_batch()
            .map(|batch| batch.status())
            .unwrap_or_default()
    }

    /// Statements of the most recent batch.
    pub fn last_executables(&self) -> Vec<Arc<ExecutableStatement>> {
        self.last_batch()
            .map(|batch| batch.executables())
            .unwrap_or_default()
    }

    /// Handle to the most recent batch.
    pub fn last_batch(&self) -> Option<BatchHandle> {
        self.last_batch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Build the executables for `options` without running them.
    ///
    /// With `is_sql_dialect` set, the text is split into statements. Statements
    /// without a first token are dropped. A `USE <db>` directive produces no
    /// executable and sets the database for the statements after it; a `USE`
    /// without a database name changes nothing. Without `is_sql_dialect`, the
    /// whole text becomes a single executable.
    ///
    /// # Errors
    /// Returns `ConfigError` if the options lack a source type.
    pub fn build_executables(
        &self,
        options: &ExecuteOptions,
    ) -> Result<Vec<Arc<ExecutableStatement>>, ConfigError> {
        if !options.is_sql_dialect {
            let executable =
                self.executable(options, options.database.clone(), &options.statements)?;
            return Ok(vec![executable]);
        }

        let mut database = options.database.clone();
        let mut executables = Vec::new();

        for parsed in self.splitter.split(&options.statements) {
            let Some(first_token) = parsed.first_token.as_deref() else {
                continue;
            };

            match Directive::classify(first_token) {
                Some(directive) => match directive.argument(&parsed.statement) {
                    Some(argument) => match directive {
                        Directive::Use => database = Some(argument),
                    },
                    None => debug!(statement = %parsed.statement, "directive without argument"),
                },
                None => {
                    let executable =
                        self.executable(options, database.clone(), &parsed.statement)?;
                    executables.push(executable);
                }
            }
        }

        Ok(executables)
    }

    /// Split `options.statements` and start executing the result.
    ///
    /// Statements run one at a time; the returned handle reports the batch
    /// outcome and cancels the batch. A batch with no executables succeeds
    /// immediately.
    ///
    /// # Errors
    /// Returns `ConfigError` if the executables cannot be built.
    ///
    /// # Panics
    /// Panics if called outside of a tokio runtime.
    pub fn execute_statements(&self, options: ExecuteOptions) -> Result<BatchHandle, ConfigError> {
        let executables = self.build_executables(&options)?;
        let batch = Arc::new(Batch::new(executables));
        let handle = BatchHandle {
            batch: Arc::clone(&batch),
        };
        *self
            .last_batch
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(handle.clone());

        info!(
            source_type = %options.source_type,
            statements = batch.executables.len(),
            "executing batch"
        );

        // Statement 0 starts before returning, so the handle can cancel it right away
        if batch.executables.is_empty() {
            batch.transition(ExecutionStatus::Running, ExecutionStatus::Success);
        } else if let Some(first) = batch.launch(0) {
            tokio::spawn(Arc::clone(&batch).run(first));
        }

        Ok(handle)
    }

    fn executable(
        &self,
        options: &ExecuteOptions,
        database: Option<String>,
        statement: &str,
    ) -> Result<Arc<ExecutableStatement>, ConfigError> {
        ExecutableStatement::builder(Arc::clone(&self.dispatcher))
            .telemetry(Arc::clone(&self.telemetry))
            .config(Arc::clone(&self.config))
            .source_type(options.source_type.as_str())
            .compute(options.compute.clone())
            .namespace(options.namespace.clone())
            .database(database)
            .statement(statement)
            .build()
    }
}
