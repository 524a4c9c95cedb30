//! Structural invariant checks for provenance graphs
//!
//! Debugging and test aid; never run implicitly while tracing.

use super::node::ItemId;
use super::prov_graph::ProvGraph;
use crate::operation::OperationId;
use thiserror::Error;

/// First invariant violation found in a graph
#[derive(Debug, Error, PartialEq)]
pub enum SanityViolation {
    #[error("Node with id {node} has source ids but no operation")]
    SourcesWithoutOperation { node: ItemId },

    #[error("Source id {source_id} in node with id {node} has no corresponding node")]
    MissingSource { node: ItemId, source_id: ItemId },

    #[error("Node with id {node} has source item with id {source_id} but reciprocate derivation link does not exist")]
    MissingBackReference { node: ItemId, source_id: ItemId },

    #[error("Derived id {derived} in node with id {node} has no corresponding node")]
    MissingDerived { node: ItemId, derived: ItemId },

    #[error("Node with id {node} has derived item with id {derived} but reciprocate source link does not exist")]
    MissingSourceLink { node: ItemId, derived: ItemId },

    #[error("Node with id {node} is part of a derivation cycle")]
    Cycle { node: ItemId },

    #[error("In sub-graph of operation {operation}: {violation}")]
    InSubGraph {
        operation: OperationId,
        violation: Box<SanityViolation>,
    },
}

#[derive(Clone, Copy, PartialEq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

impl ProvGraph {
    /// Validate the graph's structural invariants.
    ///
    /// - every source id and derived id has a node
    /// - source and derived links are reciprocal
    /// - a node with sources has an operation
    /// - derivation restricted to non-stub nodes is acyclic
    ///
    /// Sub-graphs are checked recursively. Returns the first violation found.
    pub fn check_sanity(&self) -> Result<(), SanityViolation> {
        for node in self.nodes() {
            let node_id = &node.data_item_id;
            if !node.source_ids.is_empty() && node.is_stub() {
                return Err(SanityViolation::SourcesWithoutOperation {
                    node: node_id.clone(),
                });
            }
            for source_id in &node.source_ids {
                let source = self
                    .get_node(source_id)
                    .map_err(|_| SanityViolation::MissingSource {
                        node: node_id.clone(),
                        source_id: source_id.clone(),
                    })?;
                if !source.derived_ids.contains(node_id) {
                    return Err(SanityViolation::MissingBackReference {
                        node: node_id.clone(),
                        source_id: source_id.clone(),
                    });
                }
            }
            for derived_id in &node.derived_ids {
                let derived = self
                    .get_node(derived_id)
                    .map_err(|_| SanityViolation::MissingDerived {
                        node: node_id.clone(),
                        derived: derived_id.clone(),
                    })?;
                if !derived.source_ids.contains(node_id) {
                    return Err(SanityViolation::MissingSourceLink {
                        node: node_id.clone(),
                        derived: derived_id.clone(),
                    });
                }
            }
        }

        self.check_acyclic()?;

        for (operation_id, sub_graph) in self.sub_graphs() {
            sub_graph
                .check_sanity()
                .map_err(|violation| SanityViolation::InSubGraph {
                    operation: operation_id.clone(),
                    violation: Box::new(violation),
                })?;
        }
        Ok(())
    }

    /// Iterative depth-first search along source links of non-stub nodes.
    ///
    /// Runs after the link checks, so every source id resolves to a slot.
    fn check_acyclic(&self) -> Result<(), SanityViolation> {
        let mut marks = vec![Mark::Unvisited; self.len()];

        for start in 0..self.len() {
            if marks[start] != Mark::Unvisited || self.node_at(start).is_stub() {
                continue;
            }
            // (slot, index of the next source to visit)
            let mut stack = vec![(start, 0usize)];
            marks[start] = Mark::InProgress;

            while let Some(top) = stack.last_mut() {
                let (slot, next) = *top;
                top.1 += 1;
                let node = self.node_at(slot);
                match node.source_ids.get(next) {
                    Some(source_id) => {
                        let Some(source_slot) = self.slot_of(source_id) else {
                            continue;
                        };
                        if self.node_at(source_slot).is_stub() {
                            continue;
                        }
                        match marks[source_slot] {
                            Mark::InProgress => {
                                return Err(SanityViolation::Cycle {
                                    node: source_id.clone(),
                                })
                            }
                            Mark::Unvisited => {
                                marks[source_slot] = Mark::InProgress;
                                stack.push((source_slot, 0));
                            }
                            Mark::Done => {}
                        }
                    }
                    None => {
                        marks[slot] = Mark::Done;
                        stack.pop();
                    }
                }
            }
        }
        Ok(())
    }
}
