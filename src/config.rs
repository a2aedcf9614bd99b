//! Executor configuration and per-batch execution options.
//!
//! # Example
//!
//! ```
//! # use sqlbatch_rs::config::{ExecuteOptions, ExecutorConfig};
//! # use sqlbatch_rs::transport::{ComputeContext, NamespaceContext};
//! # use std::time::Duration;
//! let config = ExecutorConfig::builder()
//!     .telemetry_category("editor")
//!     .statement_timeout(Duration::from_secs(30))
//!     .build();
//!
//! let options = ExecuteOptions::builder()
//!     .statements("USE sales; SELECT * FROM orders;")
//!     .source_type("hive")
//!     .compute(ComputeContext::new("c1", "default", "direct"))
//!     .namespace(NamespaceContext::new("ns1", "default"))
//!     .database("default")
//!     .build()?;
//! # Ok::<(), sqlbatch_rs::error::ConfigError>(())
//! ```

use crate::error::ConfigError;
use crate::transport::{ComputeContext, NamespaceContext};
use std::time::Duration;

/// Default telemetry category for usage events.
pub const DEFAULT_TELEMETRY_CATEGORY: &str = "notebook";

/// Executor-wide configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Category usage events are logged under
    pub telemetry_category: String,

    /// Upper bound for a single dispatch; `None` waits indefinitely
    pub statement_timeout: Option<Duration>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            telemetry_category: DEFAULT_TELEMETRY_CATEGORY.to_string(),
            statement_timeout: None,
        }
    }
}

impl ExecutorConfig {
    /// Create a new `ExecutorConfigBuilder`.
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }
}

/// Builder for `ExecutorConfig`.
#[derive(Debug, Default)]
pub struct ExecutorConfigBuilder {
    config: ExecutorConfig,
}

impl ExecutorConfigBuilder {
    /// Set the telemetry category.
    pub fn telemetry_category(mut self, category: impl Into<String>) -> Self {
        self.config.telemetry_category = category.into();
        self
    }

    /// Set the per-statement timeout.
    pub fn statement_timeout(mut self, timeout: Duration) -> Self {
        self.config.statement_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ExecutorConfig {
        self.config
    }
}

/// Options for one call to `Executor::execute_statements`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteOptions {
    /// Raw statement text, possibly containing several statements
    pub statements: String,

    /// Backend tag, e.g. "hive" or "impala"
    pub source_type: String,

    /// Compute target shared by all statements
    pub compute: ComputeContext,

    /// Namespace shared by all statements
    pub namespace: NamespaceContext,

    /// Database in effect before the first statement
    pub database: Option<String>,

    /// Whether the text must be split on statement boundaries
    pub is_sql_dialect: bool,
}

impl ExecuteOptions {
    /// Create a new `ExecuteOptionsBuilder`.
    pub fn builder() -> ExecuteOptionsBuilder {
        ExecuteOptionsBuilder::new()
    }
}

/// Builder for `ExecuteOptions`.
#[derive(Debug)]
pub struct ExecuteOptionsBuilder {
    statements: Option<String>,
    source_type: Option<String>,
    compute: ComputeContext,
    namespace: NamespaceContext,
    database: Option<String>,
    is_sql_dialect: bool,
}

impl Default for ExecuteOptionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecuteOptionsBuilder {
    /// Create a new builder. Statement splitting is enabled by default.
    pub fn new() -> Self {
        Self {
            statements: None,
            source_type: None,
            compute: ComputeContext::default(),
            namespace: NamespaceContext::default(),
            database: None,
            is_sql_dialect: true,
        }
    }

    /// Set the statement text.
    pub fn statements(mut self, statements: impl Into<String>) -> Self {
        self.statements = Some(statements.into());
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

    /// Set the starting database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set whether the text is split into individual statements.
    pub fn is_sql_dialect(mut self, is_sql_dialect: bool) -> Self {
        self.is_sql_dialect = is_sql_dialect;
        self
    }

    /// Build the options.
    ///
    /// # Errors
    /// Returns `ConfigError::MissingField` if statements or source type are
    /// missing, and `ConfigError::InvalidValue` for an empty source type.
    pub fn build(self) -> Result<ExecuteOptions, ConfigError> {
        let statements = self
            .statements
            .ok_or(ConfigError::MissingField("statements"))?;
        let source_type = self
            .source_type
            .ok_or(ConfigError::MissingField("source_type"))?;

        if source_type.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                option: "source_type",
                message: "must not be empty".to_string(),
            });
        }

        Ok(ExecuteOptions {
            statements,
            source_type,
            compute: self.compute,
            namespace: self.namespace,
            database: self.database,
            is_sql_dialect: self.is_sql_dialect,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executor_config_default() {
        let config = ExecutorConfig::default();
        assert_eq!(config.telemetry_category, "notebook");
        assert!(config.statement_timeout.is_none());
    }

    #[test]
    fn test_executor_config_builder() {
        let config = ExecutorConfig::builder()
            .telemetry_category("editor")
            .statement_timeout(Duration::from_millis(250))
            .build();

        assert_eq!(config.telemetry_category, "editor");
        assert_eq!(config.statement_timeout, Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_execute_options_builder() {
        let options = ExecuteOptions::builder()
            .statements("SELECT 1")
            .source_type("impala")
            .compute(ComputeContext::new("c1", "default", "direct"))
            .namespace(NamespaceContext::new("ns1", "default"))
            .database("sales")
            .build()
            .unwrap();

        assert_eq!(options.statements, "SELECT 1");
        assert_eq!(options.source_type, "impala");
        assert_eq!(options.database.as_deref(), Some("sales"));
        assert!(options.is_sql_dialect);
    }

    #[test]
    fn test_execute_options_missing_statements() {
        let result = ExecuteOptions::builder().source_type("hive").build();
        assert_eq!(result.unwrap_err(), ConfigError::MissingField("statements"));
    }

    #[test]
    fn test_execute_options_missing_source_type() {
        let result = ExecuteOptions::builder().statements("SELECT 1").build();
        assert_eq!(result.unwrap_err(), ConfigError::MissingField("source_type"));
    }

    #[test]
    fn test_execute_options_blank_source_type() {
        let result = ExecuteOptions::builder()
            .statements("SELECT 1")
            .source_type("  ")
            .build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InvalidValue { option: "source_type", .. }
        ));
    }

    #[test]
    fn test_execute_options_without_splitting() {
        let options = ExecuteOptions::builder()
            .statements("print('hi')")
            .source_type("python")
            .is_sql_dialect(false)
            .build()
            .unwrap();
        assert!(!options.is_sql_dialect);
        assert!(options.database.is_none());
    }
}
