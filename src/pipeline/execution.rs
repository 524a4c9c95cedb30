//! Pipeline: a validated graph of steps that is itself an operation

use super::step::{PipelineStep, StepId};
use crate::operation::{
    Operation, OperationDescription, OperationError, OperationResult, PortItems, SharedItem,
};
use crate::provenance::{ProvTracer, SharedTracer};
use async_trait::async_trait;
use std::time::Instant;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// A resolved port reference: indices instead of names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Binding {
    Input(usize),
    Step { step: usize, port: usize },
}

/// Composition of operations wired by port references.
///
/// Built only through `PipelineBuilder`, so the wiring is known to be
/// complete and acyclic. Steps run one at a time in a fixed topological
/// order. A pipeline is an `Operation`, so pipelines nest.
///
/// When a tracer is attached, the steps record into a private sub-tracer.
/// After each run the attached tracer gets one node per pipeline output,
/// attributed to the pipeline and derived from the pipeline inputs, while
/// the step-level graph is kept as the pipeline's sub-graph. Traced runs of
/// the same pipeline are serialized.
pub struct Pipeline {
    description: OperationDescription,
    input_count: usize,
    steps: Vec<PipelineStep>,
    /// Per step, where each of its input ports reads from
    bindings: Vec<Vec<Binding>>,
    outputs: Vec<Binding>,
    /// Step slots in execution order
    order: Vec<usize>,
    tracer: Option<SharedTracer>,
    sub_tracer: Option<SharedTracer>,
    run_lock: Mutex<()>,
}

impl Pipeline {
    pub(crate) fn assemble(
        description: OperationDescription,
        input_count: usize,
        steps: Vec<PipelineStep>,
        bindings: Vec<Vec<Binding>>,
        outputs: Vec<Binding>,
        order: Vec<usize>,
    ) -> Self {
        Self {
            description,
            input_count,
            steps,
            bindings,
            outputs,
            order,
            tracer: None,
            sub_tracer: None,
            run_lock: Mutex::new(()),
        }
    }

    /// Number of input ports
    pub fn input_count(&self) -> usize {
        self.input_count
    }

    /// Number of output ports
    pub fn output_count(&self) -> usize {
        self.outputs.len()
    }

    /// Number of steps
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// Step ids in the order they execute
    pub fn step_order(&self) -> impl Iterator<Item = &StepId> {
        self.order.iter().map(|&slot| &self.steps[slot].id)
    }

    /// True once a tracer was attached
    pub fn is_traced(&self) -> bool {
        self.tracer.is_some()
    }

    async fn execute(&self, inputs: &PortItems) -> OperationResult<PortItems> {
        let start = Instant::now();
        let mut produced: Vec<Option<PortItems>> = vec![None; self.steps.len()];

        for &slot in &self.order {
            let step = &self.steps[slot];
            let step_inputs = self.bindings[slot]
                .iter()
                .map(|binding| self.resolve(*binding, inputs, &produced))
                .collect::<OperationResult<PortItems>>()?;

            debug!(
                pipeline = %self.description.name,
                step = %step.id,
                operation = %step.operation.description().name,
                items = step_inputs.iter().map(Vec::len).sum::<usize>(),
                "running step"
            );

            let outputs = match step.operation.run(step_inputs).await {
                Ok(outputs) => outputs,
                Err(e) => {
                    warn!(
                        pipeline = %self.description.name,
                        step = %step.id,
                        error = %e,
                        "step failed"
                    );
                    return Err(e);
                }
            };
            if outputs.len() != step.output_count {
                return Err(OperationError::OutputArity {
                    operation: step.operation.description().name.clone(),
                    expected: step.output_count,
                    actual: outputs.len(),
                });
            }
            debug!(
                pipeline = %self.description.name,
                step = %step.id,
                items = outputs.iter().map(Vec::len).sum::<usize>(),
                "step finished"
            );
            produced[slot] = Some(outputs);
        }

        let outputs = self
            .outputs
            .iter()
            .map(|binding| self.resolve(*binding, inputs, &produced))
            .collect::<OperationResult<PortItems>>()?;

        info!(
            pipeline = %self.description.name,
            steps = self.steps.len(),
            elapsed = ?start.elapsed(),
            "pipeline run complete"
        );
        Ok(outputs)
    }

    fn resolve(
        &self,
        binding: Binding,
        inputs: &PortItems,
        produced: &[Option<PortItems>],
    ) -> OperationResult<Vec<SharedItem>> {
        match binding {
            Binding::Input(port) => Ok(inputs[port].clone()),
            Binding::Step { step, port } => produced[step]
                .as_ref()
                .map(|outputs| outputs[port].clone())
                .ok_or_else(|| {
                    OperationError::Internal(format!(
                        "step '{}' read before it ran",
                        self.steps[step].id
                    ))
                }),
        }
    }
}

#[async_trait]
impl Operation for Pipeline {
    fn description(&self) -> &OperationDescription {
        &self.description
    }

    async fn run(&self, inputs: PortItems) -> OperationResult<PortItems> {
        if inputs.len() != self.input_count {
            return Err(OperationError::InputArity {
                operation: self.description.name.clone(),
                expected: self.input_count,
                actual: inputs.len(),
            });
        }

        let (Some(tracer), Some(sub_tracer)) = (&self.tracer, &self.sub_tracer) else {
            return self.execute(&inputs).await;
        };

        let _guard = self.run_lock.lock().await;
        let result = self.execute(&inputs).await;
        let produced: Vec<SharedItem> = match &result {
            Ok(outputs) => outputs.iter().flatten().cloned().collect(),
            Err(_) => Vec::new(),
        };

        // a failed run has no outputs, but what its steps recorded is kept
        // as the sub-graph
        let imported = tracer.import_subgraph(sub_tracer, &self.description, &produced);
        match (result, imported) {
            (Ok(outputs), Ok(())) => Ok(outputs),
            (Ok(_), Err(e)) => Err(e.into()),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(import_error)) => {
                warn!(
                    pipeline = %self.description.name,
                    error = %import_error,
                    "could not import provenance of failed run"
                );
                Err(e)
            }
        }
    }

    fn attach_tracer(&mut self, tracer: SharedTracer) {
        let sub_tracer = ProvTracer::shared();
        for step in &mut self.steps {
            step.operation.attach_tracer(sub_tracer.clone());
        }
        self.tracer = Some(tracer);
        self.sub_tracer = Some(sub_tracer);
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("description", &self.description)
            .field("input_count", &self.input_count)
            .field("steps", &self.steps)
            .field("outputs", &self.outputs)
            .field("traced", &self.is_traced())
            .finish()
    }
}
