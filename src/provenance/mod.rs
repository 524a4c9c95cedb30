//! Provenance tracing: operations report what they produced from what,
//! the tracer keeps the resulting derivation graph.

mod tracer;
mod types;

pub use tracer::{ProvTracer, SharedTracer};
pub use types::{Prov, ProvenanceError, ProvenanceResult};
