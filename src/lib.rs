//! # sqlbatch-rs
//!
//! Sequential, cancellable execution of multi-statement SQL batches.
//!
//! Raw editor text is split into statements, `USE` directives are applied
//! locally, and the remaining statements are dispatched one at a time to a
//! remote backend through a [`transport::Dispatcher`]. The whole batch can be
//! canceled through a single handle; a failing statement stops the batch.
//!
//! ## Example
//!
//! ```no_run
//! # use sqlbatch_rs::*;
//! # use std::sync::Arc;
//! # async fn example(dispatcher: Arc<dyn Dispatcher>) -> Result<(), Box<dyn std::error::Error>> {
//! let executor = Executor::new(dispatcher);
//!
//! let batch = executor.execute_statements(
//!     ExecuteOptions::builder()
//!         .statements("USE foo; SELECT 1; USE bar; SELECT 2;")
//!         .source_type("hive")
//!         .build()?,
//! )?;
//!
//! // The first statement is already running; canceling stops it and
//! // the statements after it never start
//! batch.cancel().await;
//! assert_eq!(batch.wait().await, BatchOutcome::Canceled);
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod query;
pub mod telemetry;
pub mod transport;

// Re-export public API
pub use config::{ExecuteOptions, ExecutorConfig};
pub use error::{ConfigError, QueryError, TransportError};
pub use query::{BatchHandle, BatchOutcome, ExecutableStatement, ExecutionStatus, Executor};
pub use telemetry::{NoopTelemetry, Telemetry, TracingTelemetry};
pub use transport::{ComputeContext, Dispatcher, NamespaceContext};
