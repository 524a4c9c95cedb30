//! Provflow: Pipeline Execution with Provenance Tracing
//!
//! Composes operations into validated pipelines and records, for every item
//! an operation produces, which operation produced it from which sources.
//!
//! # Core Concepts
//!
//! - **Operations**: units of work over ordered ports of items
//! - **Pipelines**: acyclic wirings of operations; a pipeline is an operation too
//! - **Provenance**: a derivation graph with one node per traced item, stubs
//!   standing in for items of unknown origin
//!
//! # Example
//!
//! ```
//! use provflow::{PipelineBuilder, ProvTracer};
//!
//! let tracer = ProvTracer::shared();
//! let pipeline = PipelineBuilder::new("empty").build().unwrap();
//! assert_eq!(pipeline.output_count(), 0);
//! assert!(tracer.is_empty());
//! ```

pub mod document;
mod graph;
pub mod operation;
pub mod pipeline;
pub mod provenance;

pub use document::{DocPipeline, DocPipelineConfig, DocPipelineReport, Document, InputBinding};
pub use graph::{GraphError, GraphResult, ItemId, ProvGraph, ProvNode, SanityViolation};
pub use operation::{
    downcast_item, item_ids, DataItem, Operation, OperationDescription, OperationError,
    OperationId, OperationResult, PortItems, SharedItem,
};
pub use pipeline::{
    Pipeline, PipelineBuilder, PipelineError, PipelineResult, PipelineStep, PortRef, StepId,
};
pub use provenance::{Prov, ProvTracer, ProvenanceError, ProvenanceResult, SharedTracer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
