//! Execution context types shared by every statement of a batch.
//!
//! A compute is where statements run, a namespace scopes the catalog they see.
//! Both are opaque to the executor and only passed through to the dispatcher.

use serde::{Deserialize, Serialize};

/// Compute target a statement is dispatched to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputeContext {
    /// Compute identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Compute kind, e.g. "direct" or "warehouse"
    #[serde(rename = "type")]
    pub compute_type: String,
}

impl ComputeContext {
    /// Create a new compute context.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        compute_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            compute_type: compute_type.into(),
        }
    }
}

/// Namespace a statement is resolved in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamespaceContext {
    /// Namespace identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl NamespaceContext {
    /// Create a new namespace context.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_compute_context_serialization() {
        let compute = ComputeContext::new("c1", "Default", "direct");
        let value = serde_json::to_value(&compute).unwrap();
        assert_eq!(value, json!({"id": "c1", "name": "Default", "type": "direct"}));
    }

    #[test]
    fn test_namespace_context_deserialization() {
        let namespace: NamespaceContext =
            serde_json::from_value(json!({"id": "ns1", "name": "default"})).unwrap();
        assert_eq!(namespace, NamespaceContext::new("ns1", "default"));
    }
}
