//! Document transformers built on the summary chains.

mod layer;
mod row;

pub use layer::LayerSummarizer;
pub use row::RowSummaryTransformer;

use crate::chain::ChainError;
use crate::document::{Document, DocumentError};

#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error(transparent)]
    Chain(#[from] ChainError),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Copy each document's content into `metadata.summary`.
///
/// Row summaries live in `content` after [`RowSummaryTransformer`] runs, while
/// [`LayerSummarizer`] reads `metadata.summary`; this bridges the two.
pub fn promote_summaries(documents: &mut [Document]) {
    for doc in documents {
        doc.metadata.summary = Some(doc.content.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;

    #[test]
    fn promote_copies_content() {
        let mut docs = vec![
            Document::new("- a", DocumentMetadata::default()),
            Document::new(
                "- b",
                DocumentMetadata {
                    summary: Some("stale".into()),
                    ..DocumentMetadata::default()
                },
            ),
        ];
        promote_summaries(&mut docs);
        assert_eq!(docs[0].metadata.summary.as_deref(), Some("- a"));
        assert_eq!(docs[1].metadata.summary.as_deref(), Some("- b"));
    }
}
