//! ProvTracer: the facade operations record provenance into
//!
//! Owns one `ProvGraph` plus a store of every item it has seen, so queries
//! can hand back items and not only ids. Nested pipelines record into their
//! own tracer and have it imported into the enclosing one after each run.

use super::types::{Prov, ProvenanceError, ProvenanceResult};
use crate::graph::{ItemId, ProvGraph, ProvNode, SanityViolation};
use crate::operation::{item_ids, OperationDescription, OperationId, SharedItem};
use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Tracer shared between the operations of a run
pub type SharedTracer = Arc<ProvTracer>;

/// Records which operation produced which item from which sources.
///
/// Graph mutations are serialized behind a mutex, so operations holding the
/// same tracer may record from different tasks.
#[derive(Debug, Default)]
pub struct ProvTracer {
    graph: Mutex<ProvGraph>,
    items: DashMap<ItemId, SharedItem>,
}

impl ProvTracer {
    /// Create an empty tracer
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty tracer ready to be attached to operations
    pub fn shared() -> SharedTracer {
        Arc::new(Self::new())
    }

    fn graph_mut(&self) -> MutexGuard<'_, ProvGraph> {
        self.graph.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, item: &SharedItem) {
        self.items
            .entry(item.id().clone())
            .or_insert_with(|| item.clone());
    }

    fn item(&self, id: &ItemId) -> ProvenanceResult<SharedItem> {
        self.items
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| ProvenanceError::ItemNotStored(id.clone()))
    }

    /// Record that `operation` produced `item` from `sources`.
    ///
    /// `sources` may be empty (the item was generated from nothing traced)
    /// and may contain items the tracer has never seen; those get stubs.
    pub fn record(
        &self,
        item: &SharedItem,
        operation: &OperationDescription,
        sources: &[SharedItem],
    ) -> ProvenanceResult<()> {
        self.graph_mut()
            .add_node(item.id().clone(), Some(operation.clone()), item_ids(sources))?;

        self.store(item);
        for source in sources {
            self.store(source);
        }
        debug!(
            item = %item.id(),
            operation = %operation.name,
            sources = sources.len(),
            "recorded provenance"
        );
        Ok(())
    }

    /// Attribute the outputs of a nested run to the operation that ran it.
    ///
    /// Each of `output_items` that `sub` registered is recorded here with
    /// `operation` as its producer. Its sources are the stubs reached by
    /// walking `sub`'s source links back from the output: the items fed into
    /// the nested run, plus any item created untraced inside it, which stays
    /// a stub here. Intermediates never reach this graph. Outputs this tracer
    /// already knows, and outputs `sub` has no registered node for, are
    /// skipped.
    ///
    /// The whole graph of `sub` is kept as the sub-graph of `operation`, and
    /// `sub` is left empty for the next run.
    pub fn import_subgraph(
        &self,
        sub: &ProvTracer,
        operation: &OperationDescription,
        output_items: &[SharedItem],
    ) -> ProvenanceResult<()> {
        if std::ptr::eq(self, sub) {
            return Err(ProvenanceError::SelfImport);
        }

        let sub_graph = std::mem::take(&mut *sub.graph_mut());
        let sub_items: Vec<(ItemId, SharedItem)> = sub
            .items
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        sub.items.clear();

        let attributed = {
            let mut graph = self.graph_mut();
            let mut seen: HashSet<&ItemId> = HashSet::new();
            let mut attributions = Vec::new();
            for output in output_items {
                let id = output.id();
                if graph.has_node(id) || !seen.insert(id) {
                    continue;
                }
                match sub_graph.get_node(id) {
                    Ok(node) if !node.is_stub() => {}
                    _ => {
                        debug!(item = %id, operation = %operation.name, "nested output has no provenance");
                        continue;
                    }
                }
                attributions.push((id.clone(), boundary_sources(&sub_graph, id)));
            }
            graph.add_sub_graph(operation.id.clone(), sub_graph);

            let attributed = attributions.len();
            for (id, sources) in attributions {
                graph.add_node(id, Some(operation.clone()), sources)?;
            }
            attributed
        };

        for (id, item) in sub_items {
            self.items.entry(id).or_insert(item);
        }
        for output in output_items {
            self.store(output);
        }
        info!(
            operation = %operation.name,
            outputs = attributed,
            "imported nested provenance"
        );
        Ok(())
    }

    /// Provenance of an item, with items resolved
    pub fn get_prov(&self, item_id: &ItemId) -> ProvenanceResult<Prov> {
        let node = self.node(item_id)?;
        self.resolve(&node)
    }

    /// Provenance of every traced item, in insertion order
    pub fn get_provs(&self) -> ProvenanceResult<Vec<Prov>> {
        let nodes: Vec<ProvNode> = self.graph_mut().nodes().cloned().collect();
        nodes.iter().map(|node| self.resolve(node)).collect()
    }

    /// True if the tracer knows anything about the item, even only as a stub
    pub fn has_prov(&self, item_id: &ItemId) -> bool {
        self.graph_mut().has_node(item_id)
    }

    /// Id-level node of an item
    pub fn node(&self, item_id: &ItemId) -> ProvenanceResult<ProvNode> {
        Ok(self.graph_mut().get_node(item_id)?.clone())
    }

    /// Snapshot of the whole graph
    pub fn graph(&self) -> ProvGraph {
        self.graph_mut().clone()
    }

    /// Snapshot of the graph recorded inside a nested operation
    pub fn sub_graph(&self, operation_id: &OperationId) -> Option<ProvGraph> {
        self.graph_mut().sub_graph(operation_id).cloned()
    }

    /// Validate the graph's structural invariants
    pub fn check_sanity(&self) -> Result<(), SanityViolation> {
        self.graph_mut().check_sanity()
    }

    /// Get the number of traced items (stubs included)
    pub fn len(&self) -> usize {
        self.graph_mut().len()
    }

    /// Check if nothing was traced yet
    pub fn is_empty(&self) -> bool {
        self.graph_mut().is_empty()
    }

    fn resolve(&self, node: &ProvNode) -> ProvenanceResult<Prov> {
        let items = |ids: &[ItemId]| -> ProvenanceResult<Vec<SharedItem>> {
            ids.iter().map(|id| self.item(id)).collect()
        };
        Ok(Prov {
            data_item: self.item(&node.data_item_id)?,
            op_desc: node.operation.clone(),
            source_data_items: items(&node.source_ids)?,
            derived_data_items: items(&node.derived_ids)?,
        })
    }
}

/// Stubs reachable from `item_id` along source links, in first-seen order
fn boundary_sources(graph: &ProvGraph, item_id: &ItemId) -> Vec<ItemId> {
    let mut sources = Vec::new();
    let mut visited: HashSet<&ItemId> = HashSet::new();
    let mut stack: Vec<&ItemId> = match graph.get_node(item_id) {
        Ok(node) => node.source_ids.iter().rev().collect(),
        Err(_) => return sources,
    };

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        match graph.get_node(id) {
            Ok(node) if !node.is_stub() => stack.extend(node.source_ids.iter().rev()),
            _ => sources.push(id.clone()),
        }
    }
    sources
}
