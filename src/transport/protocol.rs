//! Remote dispatch abstraction trait.
//!
//! This module defines the `Dispatcher` trait that abstracts the client used to
//! run a single statement on a remote backend. The executor never talks to the
//! network itself; it hands each statement to a dispatcher and observes the
//! outcome.

use crate::error::TransportError;
use crate::query::statement::ExecutableStatement;
use async_trait::async_trait;
use serde_json::Value;

/// Remote dispatch trait for statement execution.
///
/// Implementations receive the executable itself as context, so they can read
/// the source type, compute, namespace, database and statement text they need
/// to build a request.
#[async_trait]
pub trait Dispatcher: Send + Sync {
    /// Execute a statement on the remote backend.
    ///
    /// # Arguments
    ///
    /// * `executable` - The statement being executed, with its context
    ///
    /// # Returns
    ///
    /// The backend's response payload. The executor only records it.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the backend rejects the statement or cannot
    /// be reached.
    async fn execute(&self, executable: &ExecutableStatement) -> Result<Value, TransportError>;

    /// Ask the backend to stop a statement that is currently executing.
    ///
    /// Called after the local in-flight execution has been abandoned. The
    /// default implementation does nothing, for backends without a cancel
    /// endpoint.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the cancel request could not be delivered.
    async fn cancel(&self, executable: &ExecutableStatement) -> Result<(), TransportError> {
        let _ = executable;
        Ok(())
    }
}
