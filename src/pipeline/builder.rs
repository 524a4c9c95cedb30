//! PipelineBuilder: collects steps and wiring, validates everything up front
//!
//! Steps may be added in any order. `build()` rejects unknown steps, ports
//! out of range and wiring cycles, and fixes the execution order once.

use super::execution::{Binding, Pipeline};
use super::step::{PipelineStep, PortRef, StepId};
use crate::operation::{Operation, OperationDescription};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors detected while constructing a pipeline (never at run time)
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("duplicate step id '{0}'")]
    DuplicateStep(StepId),

    #[error("{referenced_by} references unknown step '{step}'")]
    UnknownStep { referenced_by: String, step: StepId },

    #[error("{referenced_by} references pipeline input {port}, but the pipeline has {input_count} input(s)")]
    InputPortOutOfRange {
        referenced_by: String,
        port: usize,
        input_count: usize,
    },

    #[error("{referenced_by} references output {port} of step '{step}', which has {output_count} output(s)")]
    OutputPortOutOfRange {
        referenced_by: String,
        step: StepId,
        port: usize,
        output_count: usize,
    },

    #[error("wiring cycle through steps {0:?}")]
    Cycle(Vec<StepId>),

    #[error("config declares {actual} {what} but the pipeline has {expected}")]
    ConfigMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("invalid config: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline construction
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fluent construction of a `Pipeline`.
///
/// ```ignore
/// let pipeline = PipelineBuilder::new("sentence-pipeline")
///     .inputs(1)
///     .step("upper", Uppercaser::new("upper"), vec![PortRef::input(0)], 1)
///     .step("prefix", Prefixer::new("Hello! "), vec![PortRef::step("upper", 0)], 1)
///     .output(PortRef::step("prefix", 0))
///     .build()?;
/// ```
pub struct PipelineBuilder {
    description: OperationDescription,
    input_count: usize,
    steps: Vec<PipelineStep>,
    outputs: Vec<PortRef>,
}

impl PipelineBuilder {
    /// Start a pipeline described by a fresh description named `name`
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_description(OperationDescription::new(name))
    }

    /// Start a pipeline with a specific description
    pub fn with_description(description: OperationDescription) -> Self {
        Self {
            description,
            input_count: 0,
            steps: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Add a configuration entry to the pipeline's description
    pub fn with_config(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.description.config.insert(key.into(), value.into());
        self
    }

    /// Set the number of input ports
    pub fn inputs(mut self, count: usize) -> Self {
        self.input_count = count;
        self
    }

    /// Add a step
    pub fn step(
        mut self,
        id: impl Into<StepId>,
        operation: impl Operation + 'static,
        inputs: Vec<PortRef>,
        output_count: usize,
    ) -> Self {
        self.add_step(PipelineStep::new(id, operation, inputs, output_count));
        self
    }

    /// Add an already assembled step
    pub fn add_step(&mut self, step: PipelineStep) {
        self.steps.push(step);
    }

    /// Append a pipeline output port
    pub fn output(mut self, port: PortRef) -> Self {
        self.outputs.push(port);
        self
    }

    /// Validate the wiring and produce the pipeline
    pub fn build(self) -> PipelineResult<Pipeline> {
        let PipelineBuilder {
            description,
            input_count,
            steps,
            outputs,
        } = self;

        let mut index: HashMap<StepId, usize> = HashMap::new();
        for (slot, step) in steps.iter().enumerate() {
            if index.insert(step.id.clone(), slot).is_some() {
                return Err(PipelineError::DuplicateStep(step.id.clone()));
            }
        }

        let wiring = Wiring {
            index: &index,
            steps: &steps,
            input_count,
        };
        let bindings = steps
            .iter()
            .map(|step| {
                let referenced_by = format!("step '{}'", step.id);
                step.inputs
                    .iter()
                    .map(|port| wiring.resolve(port, &referenced_by))
                    .collect::<PipelineResult<Vec<_>>>()
            })
            .collect::<PipelineResult<Vec<_>>>()?;
        let output_bindings = outputs
            .iter()
            .map(|port| wiring.resolve(port, "pipeline outputs"))
            .collect::<PipelineResult<Vec<_>>>()?;

        let order = topological_order(&steps, &bindings)?;

        Ok(Pipeline::assemble(
            description,
            input_count,
            steps,
            bindings,
            output_bindings,
            order,
        ))
    }
}

struct Wiring<'a> {
    index: &'a HashMap<StepId, usize>,
    steps: &'a [PipelineStep],
    input_count: usize,
}

impl Wiring<'_> {
    fn resolve(&self, port: &PortRef, referenced_by: &str) -> PipelineResult<Binding> {
        match port {
            PortRef::Input(port) => {
                if *port >= self.input_count {
                    return Err(PipelineError::InputPortOutOfRange {
                        referenced_by: referenced_by.to_string(),
                        port: *port,
                        input_count: self.input_count,
                    });
                }
                Ok(Binding::Input(*port))
            }
            PortRef::Step { step, port } => {
                let slot = *self.index.get(step).ok_or_else(|| PipelineError::UnknownStep {
                    referenced_by: referenced_by.to_string(),
                    step: step.clone(),
                })?;
                let output_count = self.steps[slot].output_count;
                if *port >= output_count {
                    return Err(PipelineError::OutputPortOutOfRange {
                        referenced_by: referenced_by.to_string(),
                        step: step.clone(),
                        port: *port,
                        output_count,
                    });
                }
                Ok(Binding::Step { step: slot, port: *port })
            }
        }
    }
}

/// Kahn's algorithm over step-to-step bindings.
///
/// Among ready steps the one added first runs first, so the order is fully
/// determined by the wiring and the insertion order.
fn topological_order(steps: &[PipelineStep], bindings: &[Vec<Binding>]) -> PipelineResult<Vec<usize>> {
    let mut in_degree = vec![0usize; steps.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); steps.len()];
    for (consumer, step_bindings) in bindings.iter().enumerate() {
        for binding in step_bindings {
            if let Binding::Step { step: producer, .. } = *binding {
                in_degree[consumer] += 1;
                dependents[producer].push(consumer);
            }
        }
    }

    let mut ready: BTreeSet<usize> = (0..steps.len()).filter(|&s| in_degree[s] == 0).collect();
    let mut order = Vec::with_capacity(steps.len());
    while let Some(slot) = ready.pop_first() {
        order.push(slot);
        for &consumer in &dependents[slot] {
            in_degree[consumer] -= 1;
            if in_degree[consumer] == 0 {
                ready.insert(consumer);
            }
        }
    }

    if order.len() < steps.len() {
        let stuck = (0..steps.len())
            .filter(|&s| in_degree[s] > 0)
            .map(|s| steps[s].id.clone())
            .collect();
        return Err(PipelineError::Cycle(stuck));
    }
    Ok(order)
}
