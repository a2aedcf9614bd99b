//! Transport layer for remote statement execution.
//!
//! This module provides the dispatch abstraction the executor hands statements
//! to, and the context types passed along with each statement.
//!
//! # Architecture
//!
//! The transport layer is organized into:
//! - `protocol` - Dispatcher trait definition
//! - `context` - Compute and namespace context types
//!
//! # Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use serde_json::{json, Value};
//! use sqlbatch_rs::error::TransportError;
//! use sqlbatch_rs::query::ExecutableStatement;
//! use sqlbatch_rs::transport::Dispatcher;
//!
//! struct EchoDispatcher;
//!
//! #[async_trait]
//! impl Dispatcher for EchoDispatcher {
//!     async fn execute(&self, executable: &ExecutableStatement) -> Result<Value, TransportError> {
//!         Ok(json!({ "statement": executable.statement() }))
//!     }
//! }
//! ```

pub mod context;
pub mod protocol;

// Re-export commonly used types
pub use context::{ComputeContext, NamespaceContext};
pub use protocol::Dispatcher;
