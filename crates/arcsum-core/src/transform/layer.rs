use arcsum_llm::LlmProvider;

use super::TransformError;
use crate::chain::{Chain, LayerSummaryChain, block_on};
use crate::document::{Document, DocumentError, DocumentMetadata};

const LAYER_OPEN: &str = "<layer_summary>";
const LAYER_CLOSE: &str = "</layer_summary>";
const ROW_OPEN: &str = "<row_summary>";
const ROW_CLOSE: &str = "</row_summary>";

/// Collapses row summaries into a single layer-level document.
///
/// Each input must carry `metadata.summary`. The returned document holds the
/// model's narrative as `content` and the untouched inputs under
/// `metadata.input_docs`.
#[derive(Debug, Clone)]
pub struct LayerSummarizer<P> {
    chain: LayerSummaryChain<P>,
}

impl<P: LlmProvider> LayerSummarizer<P> {
    #[must_use]
    pub fn new(chain: LayerSummaryChain<P>) -> Self {
        Self { chain }
    }

    /// Tagged aggregate of every document's `metadata.summary`.
    ///
    /// Summaries are embedded verbatim; tag-like text inside a summary is not escaped.
    ///
    /// # Errors
    ///
    /// [`DocumentError::MissingMetadata`] if a document has no summary.
    pub fn summaries_str(docs: &[Document]) -> Result<String, DocumentError> {
        let rows = docs
            .iter()
            .map(|doc| {
                let summary = doc.metadata.require_summary()?;
                Ok(format!("{ROW_OPEN}\n{summary}\n{ROW_CLOSE}"))
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;
        Ok(format!("{LAYER_OPEN}\n{}\n{LAYER_CLOSE}", rows.join("\n")))
    }

    /// One model call over the aggregated summaries.
    ///
    /// # Errors
    ///
    /// Missing summaries, or the chain error unchanged.
    pub async fn summarize(&self, docs: &[Document]) -> Result<String, TransformError> {
        let summaries = Self::summaries_str(docs)?;
        Ok(self.chain.run(&summaries).await?)
    }

    /// Blocking form of [`LayerSummarizer::summarize`].
    ///
    /// # Errors
    ///
    /// Same as [`LayerSummarizer::summarize`].
    pub fn summarize_blocking(&self, docs: &[Document]) -> Result<String, TransformError> {
        block_on(self.summarize(docs))?
    }

    /// # Errors
    ///
    /// Same as [`LayerSummarizer::summarize`].
    pub async fn transform_documents(
        &self,
        documents: Vec<Document>,
    ) -> Result<Document, TransformError> {
        let text = self.summarize(&documents).await?;
        tracing::info!(rows = documents.len(), "summarized layer");
        Ok(Document::new(
            text,
            DocumentMetadata {
                input_docs: Some(documents),
                ..DocumentMetadata::default()
            },
        ))
    }

    /// Blocking form of [`LayerSummarizer::transform_documents`].
    ///
    /// # Errors
    ///
    /// Same as [`LayerSummarizer::transform_documents`].
    pub fn transform_documents_blocking(
        &self,
        documents: Vec<Document>,
    ) -> Result<Document, TransformError> {
        block_on(self.transform_documents(documents))?
    }
}
