//! Documents, prompt templates, summary chains and document transformers.
//!
//! Rows of a feature layer arrive as [`document::Document`]s whose content is the
//! row's attribute record serialized as JSON. [`transform::RowSummaryTransformer`]
//! rewrites each row into a bullet-point summary, and
//! [`transform::LayerSummarizer`] collapses row summaries into one layer-level
//! narrative.

pub mod chain;
pub mod config;
pub mod document;
pub mod prompt;
pub mod transform;

pub use chain::{Chain, ChainError, ChainInput, ChainOutput, LayerSummaryChain, RowSummaryChain};
pub use document::{Document, DocumentError, DocumentMetadata};
pub use transform::{LayerSummarizer, RowSummaryTransformer, TransformError};
