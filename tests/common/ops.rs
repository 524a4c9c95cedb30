//! Mock operations for scenario tests
//!
//! Every operation records its outputs only once a tracer is attached, so
//! the same operation can play the traced or the untraced part.

use super::items::TextItem;
use async_trait::async_trait;
use provflow::{
    downcast_item, DataItem, Operation, OperationDescription, OperationError, OperationResult,
    PortItems, SharedItem, SharedTracer,
};
use regex_lite::Regex;

fn as_text(item: &SharedItem) -> OperationResult<&TextItem> {
    downcast_item::<TextItem>(item)
        .ok_or_else(|| OperationError::InvalidInput(format!("{} is not a text item", item.id())))
}

fn single_port(description: &OperationDescription, inputs: &PortItems) -> OperationResult<()> {
    if inputs.len() != 1 {
        return Err(OperationError::InputArity {
            operation: description.name.clone(),
            expected: 1,
            actual: inputs.len(),
        });
    }
    Ok(())
}

/// Description plus optional tracer, shared by all mocks
struct Traced {
    description: OperationDescription,
    tracer: Option<SharedTracer>,
}

impl Traced {
    fn new(description: OperationDescription) -> Self {
        Self {
            description,
            tracer: None,
        }
    }

    fn record(&self, item: &SharedItem, sources: &[SharedItem]) -> OperationResult<()> {
        if let Some(tracer) = &self.tracer {
            tracer.record(item, &self.description, sources)?;
        }
        Ok(())
    }
}

macro_rules! traced_operation {
    ($ty:ty) => {
        #[async_trait]
        impl Operation for $ty {
            fn description(&self) -> &OperationDescription {
                &self.base.description
            }

            async fn run(&self, inputs: PortItems) -> OperationResult<PortItems> {
                self.apply(inputs)
            }

            fn attach_tracer(&mut self, tracer: SharedTracer) {
                self.base.tracer = Some(tracer);
            }
        }
    };
}

/// Emits fixed texts from nothing: no inputs, one output
pub struct Generator {
    base: Traced,
    texts: Vec<String>,
}

impl Generator {
    pub fn new(texts: &[&str]) -> Self {
        Self {
            base: Traced::new(OperationDescription::new("Generator")),
            texts: texts.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn apply(&self, _inputs: PortItems) -> OperationResult<PortItems> {
        let mut outputs = Vec::new();
        for text in &self.texts {
            let item = TextItem::shared(text.as_str());
            self.base.record(&item, &[])?;
            outputs.push(item);
        }
        Ok(vec![outputs])
    }
}
traced_operation!(Generator);

/// Prepends a fixed prefix to each text
pub struct Prefixer {
    base: Traced,
    prefix: String,
}

impl Prefixer {
    pub fn new(prefix: &str) -> Self {
        Self {
            base: Traced::new(OperationDescription::new("Prefixer").with_config("prefix", prefix)),
            prefix: prefix.to_string(),
        }
    }

    fn apply(&self, inputs: PortItems) -> OperationResult<PortItems> {
        single_port(&self.base.description, &inputs)?;
        let mut outputs = Vec::new();
        for item in &inputs[0] {
            let prefixed = TextItem::shared(format!("{}{}", self.prefix, as_text(item)?.text));
            self.base.record(&prefixed, &[item.clone()])?;
            outputs.push(prefixed);
        }
        Ok(vec![outputs])
    }
}
traced_operation!(Prefixer);

pub struct Uppercaser {
    base: Traced,
}

impl Uppercaser {
    pub fn new() -> Self {
        Self {
            base: Traced::new(OperationDescription::new("Uppercaser")),
        }
    }

    fn apply(&self, inputs: PortItems) -> OperationResult<PortItems> {
        single_port(&self.base.description, &inputs)?;
        let mut outputs = Vec::new();
        for item in &inputs[0] {
            let upper = TextItem::shared(as_text(item)?.text.to_uppercase());
            self.base.record(&upper, &[item.clone()])?;
            outputs.push(upper);
        }
        Ok(vec![outputs])
    }
}
traced_operation!(Uppercaser);

/// Splits each text into two halves at the middle word boundary
pub struct Splitter {
    base: Traced,
}

impl Splitter {
    pub fn new() -> Self {
        Self {
            base: Traced::new(OperationDescription::new("Splitter")),
        }
    }

    fn apply(&self, inputs: PortItems) -> OperationResult<PortItems> {
        single_port(&self.base.description, &inputs)?;
        let mut outputs = Vec::new();
        for item in &inputs[0] {
            let words: Vec<&str> = as_text(item)?.text.split_whitespace().collect();
            let (left, right) = words.split_at(words.len() / 2);
            for half in [left, right] {
                let part = TextItem::shared(half.join(" "));
                self.base.record(&part, &[item.clone()])?;
                outputs.push(part);
            }
        }
        Ok(vec![outputs])
    }
}
traced_operation!(Splitter);

/// Joins all texts of its input into a single item
pub struct Merger {
    base: Traced,
}

impl Merger {
    pub fn new() -> Self {
        Self {
            base: Traced::new(OperationDescription::new("Merger")),
        }
    }

    fn apply(&self, inputs: PortItems) -> OperationResult<PortItems> {
        single_port(&self.base.description, &inputs)?;
        let parts = inputs[0]
            .iter()
            .map(|item| as_text(item).map(|t| t.text.as_str()))
            .collect::<OperationResult<Vec<_>>>()?;
        let merged = TextItem::shared(parts.join(" "));
        self.base.record(&merged, &inputs[0])?;
        Ok(vec![vec![merged]])
    }
}
traced_operation!(Merger);

/// One output item per regex match, derived from the text it was found in
pub struct KeywordMatcher {
    base: Traced,
    pattern: Regex,
}

impl KeywordMatcher {
    pub fn new(pattern: &str) -> Self {
        Self {
            base: Traced::new(OperationDescription::new("KeywordMatcher").with_config("pattern", pattern)),
            pattern: Regex::new(pattern).unwrap(),
        }
    }

    fn apply(&self, inputs: PortItems) -> OperationResult<PortItems> {
        single_port(&self.base.description, &inputs)?;
        let mut outputs = Vec::new();
        for item in &inputs[0] {
            for found in self.pattern.find_iter(&as_text(item)?.text) {
                let entity = TextItem::shared(found.as_str());
                self.base.record(&entity, &[item.clone()])?;
                outputs.push(entity);
            }
        }
        Ok(vec![outputs])
    }
}
traced_operation!(KeywordMatcher);

/// Attaches a `label=value` attribute to each input item; no outputs
pub struct AttributeAdder {
    base: Traced,
    attribute: String,
}

impl AttributeAdder {
    pub fn new(label: &str, value: &str) -> Self {
        Self {
            base: Traced::new(
                OperationDescription::new("AttributeAdder")
                    .with_config("label", label)
                    .with_config("value", value),
            ),
            attribute: format!("{}={}", label, value),
        }
    }

    fn apply(&self, inputs: PortItems) -> OperationResult<PortItems> {
        single_port(&self.base.description, &inputs)?;
        for item in &inputs[0] {
            let attribute = TextItem::shared(self.attribute.as_str());
            self.base.record(&attribute, &[item.clone()])?;
            as_text(item)?.add_attribute(attribute);
        }
        Ok(vec![])
    }
}
traced_operation!(AttributeAdder);

/// Always fails
pub struct Failing {
    description: OperationDescription,
}

impl Failing {
    pub fn new() -> Self {
        Self {
            description: OperationDescription::new("Failing"),
        }
    }
}

#[async_trait]
impl Operation for Failing {
    fn description(&self) -> &OperationDescription {
        &self.description
    }

    async fn run(&self, _inputs: PortItems) -> OperationResult<PortItems> {
        Err(OperationError::Internal("model not loaded".into()))
    }
}
