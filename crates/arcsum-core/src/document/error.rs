#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document metadata is missing required key '{key}'")]
    MissingMetadata { key: &'static str },

    #[error("line {line}: invalid document: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("file too large: {0} bytes")]
    FileTooLarge(u64),
}
