use arcsum_llm::LlmProvider;
use serde_json::Value;

use super::TransformError;
use crate::chain::{Chain, ChainInput, RowSummaryChain, RowSummaryInput, block_on};
use crate::document::{Document, DocumentError};

/// Rewrites feature-row documents into bullet-point summaries.
///
/// For every input document exactly one output document is returned, in the
/// same order. The output's `content` is the generated summary and the row's
/// original attribute record, parsed from the input `content`, is stored in
/// `metadata.attributes`. Documents are taken by value and handed back
/// rewritten; on error nothing is returned.
///
/// Running the transformer twice fails: after the first pass `content` is a
/// summary, not JSON.
#[derive(Debug, Clone)]
pub struct RowSummaryTransformer<P> {
    chain: RowSummaryChain<P>,
}

impl<P: LlmProvider> RowSummaryTransformer<P> {
    #[must_use]
    pub fn new(chain: RowSummaryChain<P>) -> Self {
        Self { chain }
    }

    /// `item_description` and `layer_description`, joined by a newline.
    ///
    /// # Errors
    ///
    /// [`DocumentError::MissingMetadata`] if either key is absent.
    pub fn description_from_document(doc: &Document) -> Result<String, DocumentError> {
        let item = doc.metadata.require_item_description()?;
        let layer = doc.metadata.require_layer_description()?;
        Ok(format!("{item}\n{layer}"))
    }

    /// One chain input per document, in order.
    ///
    /// # Errors
    ///
    /// [`DocumentError::MissingMetadata`] for the first document lacking a required key.
    pub fn documents_to_inputs(docs: &[Document]) -> Result<Vec<ChainInput>, DocumentError> {
        docs.iter()
            .map(|doc| {
                Ok(RowSummaryInput {
                    name: doc.metadata.require_name()?.to_owned(),
                    description: Self::description_from_document(doc)?,
                    json_str: doc.content.clone(),
                }
                .into())
            })
            .collect()
    }

    /// Summaries for `docs`, in order, from one batched chain call.
    ///
    /// # Errors
    ///
    /// Missing metadata, or the chain error unchanged.
    pub async fn summarize(&self, docs: &[Document]) -> Result<Vec<String>, TransformError> {
        let inputs = Self::documents_to_inputs(docs)?;
        let outputs = self.chain.apply(&inputs).await?;
        Ok(outputs.into_iter().map(|o| o.text).collect())
    }

    /// Blocking form of [`RowSummaryTransformer::summarize`].
    ///
    /// # Errors
    ///
    /// Same as [`RowSummaryTransformer::summarize`].
    pub fn summarize_blocking(&self, docs: &[Document]) -> Result<Vec<String>, TransformError> {
        block_on(self.summarize(docs))?
    }

    /// Summarize every row and return the rewritten documents.
    ///
    /// Row contents are parsed as JSON before the model is called, so a
    /// malformed row fails the whole call without any model traffic.
    ///
    /// # Errors
    ///
    /// Invalid JSON content, missing metadata, or the chain error unchanged.
    pub async fn transform_documents(
        &self,
        documents: Vec<Document>,
    ) -> Result<Vec<Document>, TransformError> {
        let attributes = parse_attributes(&documents)?;
        let summaries = self.summarize(&documents).await?;
        tracing::info!(rows = documents.len(), "summarized rows");
        Ok(return_documents(documents, attributes, summaries))
    }

    /// Blocking form of [`RowSummaryTransformer::transform_documents`].
    ///
    /// # Errors
    ///
    /// Same as [`RowSummaryTransformer::transform_documents`].
    pub fn transform_documents_blocking(
        &self,
        documents: Vec<Document>,
    ) -> Result<Vec<Document>, TransformError> {
        block_on(self.transform_documents(documents))?
    }
}

fn parse_attributes(documents: &[Document]) -> Result<Vec<Value>, TransformError> {
    documents
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            serde_json::from_str(&doc.content).map_err(|e| {
                tracing::warn!(index, "row content is not valid JSON");
                TransformError::Json(e)
            })
        })
        .collect()
}

fn return_documents(
    documents: Vec<Document>,
    attributes: Vec<Value>,
    summaries: Vec<String>,
) -> Vec<Document> {
    documents
        .into_iter()
        .zip(attributes)
        .zip(summaries)
        .map(|((mut doc, attrs), summary)| {
            doc.metadata.attributes = Some(attrs);
            doc.content = summary;
            doc
        })
        .collect()
}
