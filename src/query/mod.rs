//! Statement execution and batch sequencing.
//!
//! This module provides the core execution functionality for sqlbatch-rs,
//! from splitting raw text into statements to running them as a cancellable
//! batch.
//!
//! # Overview
//!
//! The query module is organized into:
//! - `splitter` - Splitting raw text into statements
//! - `directive` - Statements handled locally, such as `USE`
//! - `status` - Execution status shared by statements and batches
//! - `operation` - Cancellable in-flight operations
//! - `statement` - A single executable statement
//! - `executor` - Sequential batch execution and cancellation
//!
//! # Example
//!
//! ```no_run
//! use sqlbatch_rs::config::ExecuteOptions;
//! use sqlbatch_rs::query::{BatchOutcome, Executor};
//! # use sqlbatch_rs::transport::Dispatcher;
//! # use std::sync::Arc;
//!
//! # async fn example(dispatcher: Arc<dyn Dispatcher>) -> Result<(), Box<dyn std::error::Error>> {
//! let executor = Executor::new(dispatcher);
//!
//! let options = ExecuteOptions::builder()
//!     .statements("USE sales; SELECT * FROM orders; SELECT count(*) FROM refunds;")
//!     .source_type("hive")
//!     .database("default")
//!     .build()?;
//!
//! let batch = executor.execute_statements(options)?;
//! for executable in batch.executables() {
//!     println!("{} on {:?}", executable.statement(), executable.database());
//! }
//!
//! match batch.wait().await {
//!     BatchOutcome::Succeeded => println!("done"),
//!     BatchOutcome::Failed { statement_index, error } => {
//!         println!("statement {} failed: {}", statement_index, error)
//!     }
//!     BatchOutcome::Canceled => println!("canceled"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod directive;
pub mod executor;
pub mod operation;
pub mod splitter;
pub mod statement;
pub mod status;

// Re-export commonly used types
pub use directive::Directive;
pub use executor::{BatchHandle, BatchOutcome, Executor};
pub use operation::{CancellableOperation, OperationState};
pub use splitter::{ParsedStatement, SqlStatementSplitter, StatementSplitter};
pub use statement::{ExecutableStatement, ExecutableStatementBuilder};
pub use status::ExecutionStatus;
