//! Embeddings via the shared [`LlmServiceProfiles`] embedding profile.

use std::{future::Future, pin::Pin, sync::Arc};

use ai_llm_service::LlmServiceProfiles;

use crate::{EmbeddingsProvider, VerseStoreError};

#[derive(Clone)]
pub struct LlmEmbedder {
    svc: Arc<LlmServiceProfiles>,
    dim: Option<usize>,
}

impl LlmEmbedder {
    /// `dim`: when set, every vector must have exactly this length.
    pub fn new(svc: Arc<LlmServiceProfiles>, dim: Option<usize>) -> Self {
        Self { svc, dim }
    }
}

impl EmbeddingsProvider for LlmEmbedder {
    fn embed<'a>(
        &'a self,
        text: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<f32>, VerseStoreError>> + Send + 'a>> {
        Box::pin(async move {
            let v = self.svc.embed(text).await?;
            if let Some(want) = self.dim {
                if v.len() != want {
                    return Err(VerseStoreError::VectorSizeMismatch { got: v.len(), want });
                }
            }
            Ok(v)
        })
    }
}
