//! ProvGraph: append-only derivation graph with one node per traced item

use super::node::{ItemId, ProvNode};
use crate::operation::{OperationDescription, OperationId};
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur while building or querying a provenance graph
#[derive(Debug, Error, PartialEq)]
pub enum GraphError {
    #[error("Provenance of data item {0} was already added")]
    AlreadyRegistered(ItemId),

    #[error("No provenance node for data item {0}")]
    NodeNotFound(ItemId),

    #[error("Node with id {0} has source ids but no operation")]
    SourcesWithoutOperation(ItemId),

    #[error("Node with id {0} lists itself as a source")]
    SelfDerivation(ItemId),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Directed graph of provenance nodes keyed by item identity.
///
/// Nodes live in an insertion-ordered arena; `index` maps each item id to its
/// slot. `add_node` keeps source/derived links symmetric and creates stub
/// nodes for unknown sources, so the graph is referentially complete after
/// every call. The only in-place mutation is appending to `derived_ids`: a
/// node, stub or not, is never rewritten once it is in the graph.
#[derive(Debug, Clone, Default)]
pub struct ProvGraph {
    nodes: Vec<ProvNode>,
    index: HashMap<ItemId, usize>,
    /// Graphs recorded by nested operations, keyed by the operation that ran them
    sub_graphs: Vec<(OperationId, ProvGraph)>,
}

impl ProvGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from existing nodes, as-is.
    ///
    /// Links are not completed or validated; call `check_sanity` for that.
    pub fn from_nodes(nodes: impl IntoIterator<Item = ProvNode>) -> GraphResult<Self> {
        let mut graph = Self::new();
        for node in nodes {
            graph.insert_node(node)?;
        }
        Ok(graph)
    }

    /// Insert a node without touching any other node.
    ///
    /// Used to restore graphs; normal tracing goes through `add_node`.
    pub fn insert_node(&mut self, node: ProvNode) -> GraphResult<()> {
        if self.index.contains_key(&node.data_item_id) {
            return Err(GraphError::AlreadyRegistered(node.data_item_id));
        }
        self.index.insert(node.data_item_id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Register how an item was produced.
    ///
    /// Sources without a node get a stub first, then the item is appended to
    /// the `derived_ids` of every source. An item that already has a node,
    /// even only a stub, is rejected with `AlreadyRegistered`.
    pub fn add_node(
        &mut self,
        item_id: ItemId,
        operation: Option<OperationDescription>,
        source_ids: Vec<ItemId>,
    ) -> GraphResult<()> {
        if operation.is_none() && !source_ids.is_empty() {
            return Err(GraphError::SourcesWithoutOperation(item_id));
        }
        if source_ids.contains(&item_id) {
            return Err(GraphError::SelfDerivation(item_id));
        }

        if self.index.contains_key(&item_id) {
            return Err(GraphError::AlreadyRegistered(item_id));
        }

        for source_id in &source_ids {
            if !self.index.contains_key(source_id) {
                self.insert_node(ProvNode::stub(source_id.clone()))?;
            }
        }

        self.insert_node(ProvNode {
            data_item_id: item_id.clone(),
            operation,
            source_ids: source_ids.clone(),
            derived_ids: Vec::new(),
        })?;

        for source_id in &source_ids {
            let slot = self.index[source_id];
            self.nodes[slot].derived_ids.push(item_id.clone());
        }
        Ok(())
    }

    /// Get the node of an item
    pub fn get_node(&self, item_id: &ItemId) -> GraphResult<&ProvNode> {
        self.index
            .get(item_id)
            .map(|&slot| &self.nodes[slot])
            .ok_or_else(|| GraphError::NodeNotFound(item_id.clone()))
    }

    /// Check if an item has a node (stubs included)
    pub fn has_node(&self, item_id: &ItemId) -> bool {
        self.index.contains_key(item_id)
    }

    /// All nodes, in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &ProvNode> {
        self.nodes.iter()
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the graph has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    // === Sub-graphs ===

    /// Attach the graph recorded inside a nested operation.
    ///
    /// A second graph for the same operation is merged into the first one:
    /// new nodes are appended and derived links of shared nodes are unioned.
    /// A node already present keeps its operation and sources.
    pub fn add_sub_graph(&mut self, operation_id: OperationId, graph: ProvGraph) {
        match self.sub_graphs.iter_mut().find(|(id, _)| *id == operation_id) {
            Some((_, existing)) => existing.merge(graph),
            None => self.sub_graphs.push((operation_id, graph)),
        }
    }

    /// Get the sub-graph recorded for an operation
    pub fn sub_graph(&self, operation_id: &OperationId) -> Option<&ProvGraph> {
        self.sub_graphs
            .iter()
            .find(|(id, _)| id == operation_id)
            .map(|(_, graph)| graph)
    }

    /// Check if a sub-graph was recorded for an operation
    pub fn has_sub_graph(&self, operation_id: &OperationId) -> bool {
        self.sub_graph(operation_id).is_some()
    }

    /// All sub-graphs, in the order their operations were first imported
    pub fn sub_graphs(&self) -> impl Iterator<Item = (&OperationId, &ProvGraph)> {
        self.sub_graphs.iter().map(|(id, graph)| (id, graph))
    }

    fn merge(&mut self, other: ProvGraph) {
        let ProvGraph {
            nodes, sub_graphs, ..
        } = other;

        for node in nodes {
            match self.index.get(&node.data_item_id) {
                None => {
                    self.index.insert(node.data_item_id.clone(), self.nodes.len());
                    self.nodes.push(node);
                }
                Some(&slot) => {
                    let existing = &mut self.nodes[slot];
                    for derived_id in node.derived_ids {
                        if !existing.derived_ids.contains(&derived_id) {
                            existing.derived_ids.push(derived_id);
                        }
                    }
                }
            }
        }

        for (operation_id, graph) in sub_graphs {
            self.add_sub_graph(operation_id, graph);
        }
    }

    pub(crate) fn slot_of(&self, item_id: &ItemId) -> Option<usize> {
        self.index.get(item_id).copied()
    }

    pub(crate) fn node_at(&self, slot: usize) -> &ProvNode {
        &self.nodes[slot]
    }
}
