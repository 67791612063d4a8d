use std::{future::Future, pin::Pin};

use crate::errors::VerseStoreError;

pub mod llm;

/// Provider interface for embedding generation.
///
/// Implemented for the shared LLM service; tests plug in deterministic fakes.
pub trait EmbeddingsProvider: Send + Sync {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VerseStoreError>> + Send + 'a>>;
}
