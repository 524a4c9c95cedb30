//! Provenance node representation

use crate::operation::OperationDescription;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a data item
///
/// Serializes as a plain string (UUID or caller-chosen ID like "doc-1:sentence-3")
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Create a new random ItemId (UUID-based)
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create an ItemId from a string
    pub fn from_string(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ItemId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// What is known about how one data item came to be, and what it was used for.
///
/// A node without an operation is a *stub*: the item entered the traced
/// region with unknown origin, and the node only exists so that the items
/// derived from it have something to point back to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvNode {
    /// The item this node describes
    pub data_item_id: ItemId,
    /// The operation that produced the item (`None` for stubs)
    pub operation: Option<OperationDescription>,
    /// Items the item was derived from, in the order the operation declared them
    pub source_ids: Vec<ItemId>,
    /// Items later derived from this item, in derivation order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived_ids: Vec<ItemId>,
}

impl ProvNode {
    /// Create a node attributed to an operation
    pub fn new(
        data_item_id: ItemId,
        operation: OperationDescription,
        source_ids: Vec<ItemId>,
    ) -> Self {
        Self {
            data_item_id,
            operation: Some(operation),
            source_ids,
            derived_ids: Vec::new(),
        }
    }

    /// Create a stub node (unknown origin, no sources)
    pub fn stub(data_item_id: ItemId) -> Self {
        Self {
            data_item_id,
            operation: None,
            source_ids: Vec::new(),
            derived_ids: Vec::new(),
        }
    }

    /// Add a derived item (builder style, for assembling graphs by hand)
    pub fn with_derived(mut self, derived_id: ItemId) -> Self {
        self.derived_ids.push(derived_id);
        self
    }

    /// True if nothing is known about the item's origin
    pub fn is_stub(&self) -> bool {
        self.operation.is_none()
    }
}
