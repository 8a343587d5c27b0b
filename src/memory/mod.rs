pub mod embedder;
pub mod index;
pub mod store;

use std::path::PathBuf;

use thiserror::Error;

pub use embedder::{HashEmbedder, TextEmbedder, EMBEDDING_DIM};
pub use index::VectorIndex;
pub use store::CaseMemory;

#[cfg(feature = "onnx-embeddings")]
pub use embedder::OnnxEmbedder;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("embedding generation failed: {0}")]
    Embedding(String),

    #[error("embedding model not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("embedding model initialization: {0}")]
    ModelInit(String),

    #[error("tokenization error: {0}")]
    Tokenization(String),
}
