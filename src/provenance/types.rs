//! Provenance data types returned by the tracer

use crate::graph::{GraphError, ItemId};
use crate::operation::{OperationDescription, SharedItem};
use thiserror::Error;

/// Errors from recording or querying provenance
#[derive(Debug, Error)]
pub enum ProvenanceError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("data item {0} has a provenance node but was never stored")]
    ItemNotStored(ItemId),

    #[error("a tracer cannot import its own graph")]
    SelfImport,
}

/// Result type for provenance operations
pub type ProvenanceResult<T> = Result<T, ProvenanceError>;

/// Item-level view of one provenance node
#[derive(Debug, Clone)]
pub struct Prov {
    /// The item this provenance describes
    pub data_item: SharedItem,
    /// Operation that produced it (`None` for stubs)
    pub op_desc: Option<OperationDescription>,
    /// Items it was derived from
    pub source_data_items: Vec<SharedItem>,
    /// Items later derived from it
    pub derived_data_items: Vec<SharedItem>,
}

impl Prov {
    /// Id of the described item
    pub fn id(&self) -> &ItemId {
        self.data_item.id()
    }

    /// Ids of the source items, in declared order
    pub fn source_ids(&self) -> Vec<ItemId> {
        self.source_data_items.iter().map(|i| i.id().clone()).collect()
    }

    /// Ids of the derived items, in derivation order
    pub fn derived_ids(&self) -> Vec<ItemId> {
        self.derived_data_items.iter().map(|i| i.id().clone()).collect()
    }

    /// True if nothing is known about the item's origin
    pub fn is_stub(&self) -> bool {
        self.op_desc.is_none()
    }
}

impl PartialEq for Prov {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
            && self.op_desc == other.op_desc
            && self.source_ids() == other.source_ids()
            && self.derived_ids() == other.derived_ids()
    }
}
