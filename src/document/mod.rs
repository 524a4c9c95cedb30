//! Batch runner applying a pipeline to documents

mod config;
mod runner;
mod traits;

pub use config::{DocPipelineConfig, InputBinding};
pub use runner::{DocPipeline, DocPipelineReport};
pub use traits::Document;
