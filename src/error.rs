//! Error types for sqlbatch-rs.
//!
//! This module defines domain-specific error types organized by functional area.

use thiserror::Error;

/// Errors related to statement execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    /// Statement execution failed
    #[error("Statement execution failed: {0}")]
    ExecutionFailed(String),

    /// Statement did not complete in time
    #[error("Statement timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Invalid execution state
    #[error("Invalid execution state: {0}")]
    InvalidState(String),

    /// The operation went away before reporting an outcome
    #[error("Operation dropped before settling")]
    OperationDropped,
}

/// Errors reported by the remote dispatch collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The remote side rejected the statement
    #[error("Remote execution rejected: {0}")]
    Rejected(String),

    /// The cancel request could not be delivered
    #[error("Cancel request failed: {0}")]
    CancelFailed(String),
}

/// Errors related to configuration and execution options.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required option was not provided
    #[error("Missing required option '{0}'")]
    MissingField(&'static str),

    /// An option has an unusable value
    #[error("Invalid option '{option}': {message}")]
    InvalidValue {
        option: &'static str,
        message: String,
    },
}

impl From<TransportError> for QueryError {
    fn from(err: TransportError) -> Self {
        QueryError::ExecutionFailed(err.to_string())
    }
}
