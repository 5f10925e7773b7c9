use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::DocumentError;

/// One unit of ingestible data: a text body plus metadata.
///
/// A feature row starts out with its attribute record serialized as JSON in
/// `content`; after row summarization `content` holds the summary and the
/// parsed record moves to [`DocumentMetadata::attributes`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(alias = "page_content")]
    pub content: String,
    #[serde(default)]
    pub metadata: DocumentMetadata,
}

impl Document {
    #[must_use]
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

/// Metadata keys read or written by the summarizers, with everything else
/// preserved in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layer_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Parsed attribute record. A present key is always `Some`, so a JSON
    /// `null` record survives a write/read cycle.
    #[serde(
        default,
        deserialize_with = "present_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub attributes: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_docs: Option<Vec<Document>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DocumentMetadata {
    /// # Errors
    ///
    /// Returns [`DocumentError::MissingMetadata`] when `name` is absent.
    pub fn require_name(&self) -> Result<&str, DocumentError> {
        require(self.name.as_deref(), "name")
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::MissingMetadata`] when `item_description` is absent.
    pub fn require_item_description(&self) -> Result<&str, DocumentError> {
        require(self.item_description.as_deref(), "item_description")
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::MissingMetadata`] when `layer_description` is absent.
    pub fn require_layer_description(&self) -> Result<&str, DocumentError> {
        require(self.layer_description.as_deref(), "layer_description")
    }

    /// # Errors
    ///
    /// Returns [`DocumentError::MissingMetadata`] when `summary` is absent.
    pub fn require_summary(&self) -> Result<&str, DocumentError> {
        require(self.summary.as_deref(), "summary")
    }
}

fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

fn require<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, DocumentError> {
    value.ok_or(DocumentError::MissingMetadata { key })
}
