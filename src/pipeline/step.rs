//! Pipeline steps and the port references that wire them

use crate::operation::Operation;

/// Caller-chosen name of a step, unique within its pipeline
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StepId(String);

impl StepId {
    /// Create a StepId from a step name
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the step name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for StepId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where the items of one port come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortRef {
    /// An input port of the pipeline itself
    Input(usize),
    /// An output port of another step
    Step { step: StepId, port: usize },
}

impl PortRef {
    /// Input port `port` of the pipeline
    pub fn input(port: usize) -> Self {
        Self::Input(port)
    }

    /// Output port `port` of step `step`
    pub fn step(step: impl Into<StepId>, port: usize) -> Self {
        Self::Step {
            step: step.into(),
            port,
        }
    }
}

/// One operation wired into a pipeline.
///
/// `inputs[i]` feeds input port `i` of the operation. A step may have zero
/// outputs when its operation only annotates the items it receives.
pub struct PipelineStep {
    pub id: StepId,
    pub operation: Box<dyn Operation>,
    pub inputs: Vec<PortRef>,
    pub output_count: usize,
}

impl PipelineStep {
    pub fn new(
        id: impl Into<StepId>,
        operation: impl Operation + 'static,
        inputs: Vec<PortRef>,
        output_count: usize,
    ) -> Self {
        Self {
            id: id.into(),
            operation: Box::new(operation),
            inputs,
            output_count,
        }
    }
}

impl std::fmt::Debug for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineStep")
            .field("id", &self.id)
            .field("operation", &self.operation.description().name)
            .field("inputs", &self.inputs)
            .field("output_count", &self.output_count)
            .finish()
    }
}
