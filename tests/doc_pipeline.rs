//! Batch runs over documents, with config loaded from YAML

mod common;

use common::{init_tracing, texts, KeywordMatcher, MockDocument, Prefixer, Uppercaser};
use provflow::{
    DataItem, DocPipeline, DocPipelineConfig, DocPipelineReport, Document, Operation, Pipeline,
    PipelineBuilder, PipelineError, PortRef, ProvTracer,
};
use std::io::Write;
use tempfile::NamedTempFile;

/// Two independent branches: sentences are uppercased, entities prefixed
fn two_branch_pipeline() -> Pipeline {
    PipelineBuilder::new("sentences-and-entities")
        .inputs(2)
        .step("upper", Uppercaser::new(), vec![PortRef::input(0)], 1)
        .step("prefix", Prefixer::new("entity: "), vec![PortRef::input(1)], 1)
        .output(PortRef::step("upper", 0))
        .output(PortRef::step("prefix", 0))
        .build()
        .unwrap()
}

const CONFIG: &str = r#"
inputs:
  - selectors: [sentence, alt_sentence]
  - selectors: [entity]
outputs: [uppercased_sentence, prefixed_entity]
"#;

fn documents() -> Vec<MockDocument> {
    vec![
        MockDocument::new()
            .with_texts("sentence", &["the first sentence"])
            .with_texts("alt_sentence", &["an alternative"])
            .with_texts("entity", &["asthma"]),
        MockDocument::new().with_texts("entity", &["fever", "cough"]),
        MockDocument::new().with_texts("title", &["nothing selected here"]),
    ]
}

#[tokio::test]
async fn config_from_file_drives_the_batch() {
    init_tracing();
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(CONFIG.as_bytes()).unwrap();
    let config = DocPipelineConfig::from_file(file.path()).unwrap();

    let runner = DocPipeline::new(two_branch_pipeline(), config).unwrap();
    let mut docs = documents();
    let report = runner.run(&mut docs).await.unwrap();

    assert_eq!(
        report,
        DocPipelineReport {
            documents: 3,
            empty_input_documents: 1,
            items_written: 5,
        }
    );
    // selectors of one port are concatenated in selector order
    assert_eq!(
        docs[0].texts("uppercased_sentence"),
        vec!["THE FIRST SENTENCE", "AN ALTERNATIVE"]
    );
    assert_eq!(docs[0].texts("prefixed_entity"), vec!["entity: asthma"]);
    assert_eq!(
        docs[1].texts("prefixed_entity"),
        vec!["entity: fever", "entity: cough"]
    );
    assert!(docs[1].texts("uppercased_sentence").is_empty());
    // the empty document went through the pipeline but got nothing
    assert!(docs[2].texts("prefixed_entity").is_empty());
    assert_eq!(docs[2].texts("title"), vec!["nothing selected here"]);
}

#[tokio::test]
async fn batch_provenance_is_one_graph() {
    init_tracing();
    let tracer = ProvTracer::shared();
    let mut runner = DocPipeline::new(
        two_branch_pipeline(),
        DocPipelineConfig::from_yaml(CONFIG).unwrap(),
    )
    .unwrap();
    runner.attach_tracer(tracer.clone());

    let mut docs = documents();
    runner.run(&mut docs).await.unwrap();

    // 5 input stubs plus one node per written item
    assert_eq!(tracer.len(), 10);
    for doc in &docs {
        let entities = doc.items_by_selector("entity");
        let prefixed = doc.items_by_selector("prefixed_entity");
        assert_eq!(entities.len(), prefixed.len());
        for (entity, output) in entities.iter().zip(&prefixed) {
            let prov = tracer.get_prov(output.id()).unwrap();
            assert_eq!(prov.source_ids(), vec![entity.id().clone()]);
            assert_eq!(prov.op_desc.as_ref().unwrap().name, "sentences-and-entities");
        }
    }
    // step attribution is one level down
    let sub_graph = tracer.sub_graph(&runner.pipeline().description().id).unwrap();
    assert_eq!(sub_graph.len(), 10);
    let prefixed = docs[1].items_by_selector("prefixed_entity");
    let node = sub_graph.get_node(prefixed[0].id()).unwrap();
    assert_eq!(node.operation.as_ref().unwrap().name, "Prefixer");
    tracer.check_sanity().unwrap();
}

#[tokio::test]
async fn nested_keyword_pipeline_over_documents() {
    let inner = PipelineBuilder::new("keywords")
        .inputs(1)
        .step("match", KeywordMatcher::new(r"\b(asthma|fever)\b"), vec![PortRef::input(0)], 1)
        .output(PortRef::step("match", 0))
        .build()
        .unwrap();
    let pipeline = PipelineBuilder::new("outer")
        .inputs(1)
        .step("keywords", inner, vec![PortRef::input(0)], 1)
        .step("upper", Uppercaser::new(), vec![PortRef::step("keywords", 0)], 1)
        .output(PortRef::step("upper", 0))
        .build()
        .unwrap();
    let config = DocPipelineConfig::new().input(["sentence"]).output("keyword");
    let runner = DocPipeline::new(pipeline, config).unwrap();

    let mut docs = vec![
        MockDocument::new().with_texts("sentence", &["asthma and fever", "no finding"]),
        MockDocument::new().with_texts("sentence", &["fever only"]),
    ];
    let report = runner.run(&mut docs).await.unwrap();

    assert_eq!(report.items_written, 3);
    assert_eq!(docs[0].texts("keyword"), vec!["ASTHMA", "FEVER"]);
    assert_eq!(texts(&docs[1].items_by_selector("keyword")), vec!["FEVER"]);
}

#[test]
fn config_must_match_pipeline_ports() {
    let config = DocPipelineConfig::new()
        .input(["sentence"])
        .output("uppercased_sentence")
        .output("prefixed_entity");
    let err = DocPipeline::new(two_branch_pipeline(), config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::ConfigMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn malformed_yaml_is_a_config_error() {
    let err = DocPipelineConfig::from_yaml("inputs: [selectors: ").unwrap_err();
    assert!(matches!(err, PipelineError::Config(_)));
}
