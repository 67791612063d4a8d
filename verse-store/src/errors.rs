//! Unified error type for the verse store.

use ai_llm_service::AiLlmError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerseStoreError {
    /// I/O or filesystem errors (corpus file).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A corpus line is not valid JSON.
    #[error("parse error at line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// A corpus row is structurally invalid (blank id, duplicate id, wrong field type).
    #[error("invalid corpus row at line {line}: {reason}")]
    InvalidRow { line: usize, reason: String },

    /// Nothing to index.
    #[error("corpus contains no non-empty translation variants")]
    EmptyCorpus,

    /// Invalid or unsupported configuration.
    #[error("config error: {0}")]
    Config(String),

    /// Mismatch in vector dimensionality.
    #[error("vector size mismatch: got {got}, want {want}")]
    VectorSizeMismatch { got: usize, want: usize },

    /// Embedding backend failure.
    #[error("embedding failed: {0}")]
    Embedding(#[from] AiLlmError),

    /// Qdrant client errors (wrapped).
    #[error("qdrant error: {0}")]
    Qdrant(String),

    /// `search` was called before the one-time index build completed.
    #[error("verse index is not initialized")]
    NotReady,
}
