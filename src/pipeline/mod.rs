//! Pipeline composition and execution
//!
//! Steps are operations wired together by port references. A built
//! pipeline is validated once and then behaves like any other operation,
//! including being a step of another pipeline.

mod builder;
mod execution;
mod step;

pub use builder::{PipelineBuilder, PipelineError, PipelineResult};
pub use execution::Pipeline;
pub use step::{PipelineStep, PortRef, StepId};
