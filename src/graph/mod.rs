//! Provenance graph data structures

mod node;
mod prov_graph;
mod sanity;


pub use node::{ItemId, ProvNode};
pub use prov_graph::{GraphError, GraphResult, ProvGraph};
pub use sanity::SanityViolation;
