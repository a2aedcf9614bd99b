//! Usage telemetry.
//!
//! Statements report `execute/<source type>` and `cancel/<source type>` actions
//! under a category. Sinks are fire-and-forget: `log` cannot fail and must not
//! block the caller.

use tracing::info;

/// Sink for usage events.
pub trait Telemetry: Send + Sync {
    /// Record that `action` happened in `category`.
    fn log(&self, category: &str, action: &str);
}

/// Forwards usage events to `tracing` on the `sqlbatch::telemetry` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl Telemetry for TracingTelemetry {
    fn log(&self, category: &str, action: &str) {
        info!(target: "sqlbatch::telemetry", category, action, "usage event");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl Telemetry for NoopTelemetry {
    fn log(&self, _category: &str, _action: &str) {}
}

/// Builds the action name for executing a statement of `source_type`.
pub(crate) fn execute_action(source_type: &str) -> String {
    format!("execute/{}", source_type)
}

/// Builds the action name for canceling a statement of `source_type`.
pub(crate) fn cancel_action(source_type: &str) -> String {
    format!("cancel/{}", source_type)
}
