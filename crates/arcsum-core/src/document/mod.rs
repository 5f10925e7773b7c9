pub mod error;
pub mod loader;
pub mod types;

pub use error::DocumentError;
pub use loader::{JsonlLoader, write_jsonl};
pub use types::{Document, DocumentMetadata};

/// Default maximum input file size: 256 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;

pub trait DocumentLoader: Send + Sync {
    fn load(
        &self,
        path: &std::path::Path,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Document>, DocumentError>> + Send + '_>,
    >;

    fn supported_extensions(&self) -> &[&str];
}
