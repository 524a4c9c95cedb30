//! DocPipelineConfig: which document items feed a pipeline and where its
//! outputs go
//!
//! ```yaml
//! inputs:
//!   - selectors: [sentence, alt_sentence]
//!   - selectors: [entity]
//! outputs: [uppercased_sentence, prefixed_entity]
//! ```

use crate::pipeline::{PipelineError, PipelineResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Selectors feeding one pipeline input port.
///
/// Items of several selectors are concatenated in selector order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputBinding {
    pub selectors: Vec<String>,
}

/// Wiring between documents and a pipeline: one `InputBinding` per input
/// port and one label per output port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DocPipelineConfig {
    #[serde(default)]
    pub inputs: Vec<InputBinding>,
    #[serde(default)]
    pub outputs: Vec<String>,
}

impl DocPipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the next input port to `selectors`
    pub fn input<S: Into<String>>(mut self, selectors: impl IntoIterator<Item = S>) -> Self {
        self.inputs.push(InputBinding {
            selectors: selectors.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Label the items of the next output port
    pub fn output(mut self, label: impl Into<String>) -> Self {
        self.outputs.push(label.into());
        self
    }

    /// Parse from YAML text
    pub fn from_yaml(yaml: &str) -> PipelineResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub(crate) fn check_ports(&self, input_count: usize, output_count: usize) -> PipelineResult<()> {
        if self.inputs.len() != input_count {
            return Err(PipelineError::ConfigMismatch {
                what: "input binding(s)",
                expected: input_count,
                actual: self.inputs.len(),
            });
        }
        if self.outputs.len() != output_count {
            return Err(PipelineError::ConfigMismatch {
                what: "output label(s)",
                expected: output_count,
                actual: self.outputs.len(),
            });
        }
        Ok(())
    }
}
