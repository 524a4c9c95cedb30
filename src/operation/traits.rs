//! Operation trait: the contract every unit of work implements
//!
//! A single annotator and a whole pipeline look the same to their caller:
//! a description, a `run` over ordered ports of items, and an optional
//! tracer to record provenance into.

use super::description::OperationDescription;
use super::error::OperationResult;
use super::item::SharedItem;
use crate::provenance::SharedTracer;
use async_trait::async_trait;

/// Items on each port of an operation, in port order.
pub type PortItems = Vec<Vec<SharedItem>>;

/// The contract operations implement.
///
/// `run` receives one sequence of items per input port and returns one
/// sequence per output port. How many ports there are is up to the
/// operation; a pipeline step checks the output count it was wired with.
///
/// # Example
///
/// ```ignore
/// struct Uppercaser {
///     description: OperationDescription,
///     tracer: Option<SharedTracer>,
/// }
///
/// #[async_trait]
/// impl Operation for Uppercaser {
///     fn description(&self) -> &OperationDescription { &self.description }
///
///     async fn run(&self, inputs: PortItems) -> OperationResult<PortItems> {
///         let mut outputs = Vec::new();
///         for item in &inputs[0] {
///             let upper: SharedItem = Arc::new(uppercase(item)?);
///             if let Some(tracer) = &self.tracer {
///                 tracer.record(&upper, &self.description, &[item.clone()])?;
///             }
///             outputs.push(upper);
///         }
///         Ok(vec![outputs])
///     }
///
///     fn attach_tracer(&mut self, tracer: SharedTracer) { self.tracer = Some(tracer); }
/// }
/// ```
#[async_trait]
pub trait Operation: Send + Sync {
    /// Description of this instance, stable for its lifetime
    fn description(&self) -> &OperationDescription;

    /// Transform input ports into output ports.
    async fn run(&self, inputs: PortItems) -> OperationResult<PortItems>;

    /// Hand the operation a tracer to record its outputs into.
    ///
    /// Operations that do not override this stay provenance-silent: their
    /// outputs only show up as stubs once a traced operation consumes them.
    fn attach_tracer(&mut self, _tracer: SharedTracer) {}
}
