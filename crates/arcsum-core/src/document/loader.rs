use std::path::Path;

use super::{DEFAULT_MAX_FILE_SIZE, Document, DocumentError, DocumentLoader};

/// Reads newline-delimited JSON: one serialized [`Document`] per non-blank line.
#[derive(Debug, Clone)]
pub struct JsonlLoader {
    max_file_size: u64,
}

impl Default for JsonlLoader {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl JsonlLoader {
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Parse documents from an in-memory JSONL string.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] with the 1-based line number of the first bad line.
    pub fn parse_str(text: &str) -> Result<Vec<Document>, DocumentError> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str(line).map_err(|source| DocumentError::Parse {
                    line: idx + 1,
                    source,
                })
            })
            .collect()
    }
}

impl DocumentLoader for JsonlLoader {
    fn load(
        &self,
        path: &Path,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + '_>,
    > {
        let path = path.to_path_buf();
        Box::pin(async move {
            let meta = tokio::fs::metadata(&path).await?;
            if meta.len() > self.max_file_size {
                return Err(DocumentError::FileTooLarge(meta.len()));
            }
            let text = tokio::fs::read_to_string(&path).await?;
            let documents = Self::parse_str(&text)?;
            tracing::debug!(path = %path.display(), count = documents.len(), "loaded documents");
            Ok(documents)
        })
    }

    fn supported_extensions(&self) -> &[&str] {
        &["jsonl", "ndjson"]
    }
}

/// Write documents as JSONL, one per line.
///
/// # Errors
///
/// Returns an error if serialization or the file write fails.
pub async fn write_jsonl(path: &Path, documents: &[Document]) -> Result<(), DocumentError> {
    let mut out = String::new();
    for doc in documents {
        out.push_str(&serde_json::to_string(doc)?);
        out.push('\n');
    }
    tokio::fs::write(path, out).await?;
    Ok(())
}
