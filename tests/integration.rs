use std::sync::{Arc, Mutex};

use arcsum_core::chain::{Chain, LayerSummaryChain, RowSummaryChain};
use arcsum_core::document::{Document, DocumentLoader, DocumentMetadata, JsonlLoader, write_jsonl};
use arcsum_core::transform::{
    LayerSummarizer, RowSummaryTransformer, TransformError, promote_summaries,
};
use arcsum_llm::mock::MockProvider;
use arcsum_llm::{LlmError, LlmProvider, Message};

// -- Echo provider --

/// Answers each prompt with a summary derived from the row name it contains,
/// so outputs can be matched to inputs regardless of call order.
#[derive(Clone, Default)]
struct EchoNameProvider {
    prompts: Arc<Mutex<Vec<String>>>,
}

impl LlmProvider for EchoNameProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        let user = messages
            .last()
            .map(|m| m.content.clone())
            .ok_or_else(|| LlmError::Other("no messages".into()))?;
        self.prompts.lock().unwrap().push(user.clone());
        if user.starts_with("<layer_summary>") {
            let rows = user.matches("<row_summary>").count();
            return Ok(format!("layer of {rows} rows"));
        }
        let name = user
            .lines()
            .find_map(|l| l.strip_prefix("Dataset name: "))
            .unwrap_or("unknown");
        Ok(format!("- feature from {name}"))
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "echo"
    }
}

// -- Helpers --

fn row(name: &str, attributes: &serde_json::Value) -> Document {
    Document::new(
        attributes.to_string(),
        DocumentMetadata {
            name: Some(name.into()),
            item_description: Some("Fire hydrants maintained by the city".into()),
            layer_description: Some("Point layer of hydrant locations".into()),
            ..DocumentMetadata::default()
        },
    )
}

fn rows() -> Vec<Document> {
    vec![
        row("Hydrants A", &serde_json::json!({"FID": 1, "STATUS": "active"})),
        row("Hydrants B", &serde_json::json!({"FID": 2, "STATUS": "retired"})),
        row("Hydrants C", &serde_json::json!({"FID": 3, "STATUS": null})),
    ]
}

// -- Pipeline --

#[tokio::test]
async fn rows_then_layer_pipeline() {
    let provider = EchoNameProvider::default();
    let transformer = RowSummaryTransformer::new(RowSummaryChain::new(provider.clone()));
    let summarizer = LayerSummarizer::new(LayerSummaryChain::new(provider.clone()));

    let mut summarized = transformer.transform_documents(rows()).await.unwrap();
    let contents: Vec<_> = summarized.iter().map(|d| d.content.as_str()).collect();
    assert_eq!(
        contents,
        [
            "- feature from Hydrants A",
            "- feature from Hydrants B",
            "- feature from Hydrants C"
        ]
    );
    assert_eq!(
        summarized[1].metadata.attributes,
        Some(serde_json::json!({"FID": 2, "STATUS": "retired"}))
    );

    promote_summaries(&mut summarized);
    let layer = summarizer
        .transform_documents(summarized.clone())
        .await
        .unwrap();

    assert_eq!(layer.content, "layer of 3 rows");
    assert_eq!(layer.metadata.input_docs, Some(summarized));

    let prompts = provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[3].contains("<row_summary>\n- feature from Hydrants B\n</row_summary>"));
}

#[tokio::test]
async fn pipeline_through_jsonl_files() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("rows.jsonl");
    let output = dir.path().join("summaries.jsonl");
    write_jsonl(&input, &rows()).await.unwrap();

    let loaded = JsonlLoader::default().load(&input).await.unwrap();
    let transformer = RowSummaryTransformer::new(RowSummaryChain::new(MockProvider::default()));
    let summarized = transformer.transform_documents(loaded).await.unwrap();
    write_jsonl(&output, &summarized).await.unwrap();

    let reloaded = JsonlLoader::default().load(&output).await.unwrap();
    assert_eq!(reloaded, summarized);
    assert!(reloaded.iter().all(|d| d.content == "mock response"));
}

#[tokio::test]
async fn layer_without_promoted_summaries_fails() {
    let transformer = RowSummaryTransformer::new(RowSummaryChain::new(MockProvider::default()));
    let summarized = transformer.transform_documents(rows()).await.unwrap();

    let mock = MockProvider::default();
    let summarizer = LayerSummarizer::new(LayerSummaryChain::new(mock.clone()));
    let err = summarizer.transform_documents(summarized).await.unwrap_err();

    assert!(matches!(err, TransformError::Document(_)));
    assert!(mock.received().is_empty());
}

#[tokio::test]
async fn row_batch_is_one_submission() {
    let mock = MockProvider::default();
    let transformer = RowSummaryTransformer::new(RowSummaryChain::new(mock.clone()));
    transformer.transform_documents(rows()).await.unwrap();

    assert_eq!(mock.batch_count(), 1);
    assert_eq!(mock.received().len(), 3);
}

#[test]
fn blocking_pipeline_matches_async() {
    let blocking = {
        let provider = EchoNameProvider::default();
        let transformer = RowSummaryTransformer::new(RowSummaryChain::new(provider.clone()));
        let mut docs = transformer.transform_documents_blocking(rows()).unwrap();
        promote_summaries(&mut docs);
        LayerSummarizer::new(LayerSummaryChain::new(provider))
            .transform_documents_blocking(docs)
            .unwrap()
    };

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let suspending = runtime.block_on(async {
        let provider = EchoNameProvider::default();
        let transformer = RowSummaryTransformer::new(RowSummaryChain::new(provider.clone()));
        let mut docs = transformer.transform_documents(rows()).await.unwrap();
        promote_summaries(&mut docs);
        LayerSummarizer::new(LayerSummaryChain::new(provider))
            .transform_documents(docs)
            .await
            .unwrap()
    });

    assert_eq!(blocking, suspending);
}

#[tokio::test]
async fn layer_chain_run_accepts_raw_aggregate() {
    let chain = LayerSummaryChain::new(EchoNameProvider::default());
    let text = chain
        .run("<layer_summary>\n<row_summary>\nx\n</row_summary>\n</layer_summary>")
        .await
        .unwrap();
    assert_eq!(text, "layer of 1 rows");
}
