//! Operation descriptions: who produced an item, independent of the instance

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for an operation instance
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    /// Create a new random OperationId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an OperationId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for OperationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OperationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OperationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Immutable description of one operation instance.
///
/// `config` should hold enough to re-create an equivalent instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationDescription {
    /// Unique identifier of the instance
    pub id: OperationId,
    /// Name of the operation (typically the type name)
    pub name: String,
    /// Instance configuration
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
}

impl OperationDescription {
    /// Describe a new operation instance with a random id
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: OperationId::new(),
            name: name.into(),
            config: BTreeMap::new(),
        }
    }

    /// Describe an operation instance with a specific id
    pub fn with_id(id: OperationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            config: BTreeMap::new(),
        }
    }

    /// Add a configuration entry
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.config.insert(key.into(), value.into());
        self
    }
}
