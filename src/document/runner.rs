//! DocPipeline: runs a pipeline over a batch of documents

use super::config::DocPipelineConfig;
use super::traits::Document;
use crate::operation::{Operation, OperationResult, PortItems};
use crate::pipeline::{Pipeline, PipelineResult};
use crate::provenance::SharedTracer;
use serde::Serialize;
use tracing::{info, warn};

/// Summary of one batch run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DocPipelineReport {
    pub documents: usize,
    /// Documents none of whose selectors matched anything
    pub empty_input_documents: usize,
    pub items_written: usize,
}

/// Applies a pipeline to documents one at a time.
///
/// Inputs are read from each document through the configured selectors and
/// outputs are written back to the same document under the configured
/// labels. With a tracer attached, every document's provenance ends up in
/// that one tracer.
#[derive(Debug)]
pub struct DocPipeline {
    pipeline: Pipeline,
    config: DocPipelineConfig,
}

impl DocPipeline {
    /// Pair a pipeline with its document wiring.
    ///
    /// Fails when the config does not declare exactly one input binding per
    /// pipeline input and one label per pipeline output.
    pub fn new(pipeline: Pipeline, config: DocPipelineConfig) -> PipelineResult<Self> {
        config.check_ports(pipeline.input_count(), pipeline.output_count())?;
        Ok(Self { pipeline, config })
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    pub fn config(&self) -> &DocPipelineConfig {
        &self.config
    }

    /// Record the provenance of every run into `tracer`
    pub fn attach_tracer(&mut self, tracer: SharedTracer) {
        self.pipeline.attach_tracer(tracer);
    }

    /// Run the pipeline over `docs`, in order.
    ///
    /// The first failing document aborts the batch; documents before it keep
    /// their written items.
    pub async fn run<D: Document>(&self, docs: &mut [D]) -> OperationResult<DocPipelineReport> {
        let mut report = DocPipelineReport::default();

        for doc in docs.iter_mut() {
            let inputs: PortItems = self
                .config
                .inputs
                .iter()
                .map(|binding| {
                    binding
                        .selectors
                        .iter()
                        .flat_map(|selector| doc.items_by_selector(selector))
                        .collect()
                })
                .collect();

            let input_items: usize = inputs.iter().map(Vec::len).sum();
            if input_items == 0 {
                warn!(
                    document = %doc.id(),
                    pipeline = %self.pipeline.description().name,
                    "no input items found in document, running with empty input"
                );
                report.empty_input_documents += 1;
            }

            let outputs = self.pipeline.run(inputs).await?;

            let mut written = 0;
            for (items, label) in outputs.into_iter().zip(&self.config.outputs) {
                for item in items {
                    doc.add_item(item, label);
                    written += 1;
                }
            }
            info!(
                document = %doc.id(),
                input_items,
                written,
                "document processed"
            );
            report.documents += 1;
            report.items_written += written;
        }

        info!(
            pipeline = %self.pipeline.description().name,
            documents = report.documents,
            empty_input_documents = report.empty_input_documents,
            items_written = report.items_written,
            "batch complete"
        );
        Ok(report)
    }
}
