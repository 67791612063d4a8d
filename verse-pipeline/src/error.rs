//! Typed errors for the verse pipeline.

use ai_llm_service::AiLlmError;
use thiserror::Error;
use verse_store::VerseStoreError;

/// Failure reported by an injected collaborator (generator or index).
#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Llm(#[from] AiLlmError),

    #[error(transparent)]
    Store(#[from] VerseStoreError),

    /// Free-form failure from other [`TextGenerator`](crate::TextGenerator) or
    /// [`PassageIndex`](crate::PassageIndex) implementations.
    #[error("{0}")]
    Other(String),
}

/// Request-level failure. A question with no matching verses is **not** an
/// error; it yields an empty result.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("query expansion failed: {0}")]
    Expansion(#[source] BackendError),

    #[error("query expansion returned no usable variations")]
    EmptyExpansion,

    #[error("verse index unavailable: {0}")]
    IndexUnavailable(#[source] BackendError),

    #[error("explanation failed for verse {verse_id}: {source}")]
    Explanation {
        verse_id: String,
        #[source]
        source: BackendError,
    },

    #[error("explanation for verse {verse_id} was empty")]
    EmptyExplanation { verse_id: String },
}

/// Coarse failure class, used by callers to pick a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Expansion,
    IndexUnavailable,
    Explanation,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Expansion(_) | PipelineError::EmptyExpansion => FailureKind::Expansion,
            PipelineError::IndexUnavailable(_) => FailureKind::IndexUnavailable,
            PipelineError::Explanation { .. } | PipelineError::EmptyExplanation { .. } => {
                FailureKind::Explanation
            }
        }
    }
}
