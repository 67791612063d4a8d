//! Seams to the generative backend and the passage index.
//!
//! Both are injected into [`GitaPipeline`](crate::GitaPipeline) as shared,
//! read-only trait objects. The production implementations delegate to
//! [`LlmServiceProfiles`] and [`VerseStore`].

use std::{future::Future, pin::Pin};

use ai_llm_service::{GenerateOptions, LlmServiceProfiles};
use verse_store::{PassageHit, VerseStore};

use crate::error::BackendError;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// `complete(prompt, options) -> text`. Failures must be signalled, never
/// swallowed into an empty string.
pub trait TextGenerator: Send + Sync {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        opts: GenerateOptions,
    ) -> BoxFuture<'a, Result<String, BackendError>>;
}

/// `search(query, k) -> hits ordered by score`.
pub trait PassageIndex: Send + Sync {
    fn search<'a>(&'a self, query: &'a str, k: u64)
    -> BoxFuture<'a, Result<Vec<PassageHit>, BackendError>>;
}

impl TextGenerator for LlmServiceProfiles {
    fn complete<'a>(
        &'a self,
        prompt: &'a str,
        opts: GenerateOptions,
    ) -> BoxFuture<'a, Result<String, BackendError>> {
        Box::pin(async move { Ok(self.generate_fast_with(prompt, None, &opts).await?) })
    }
}

impl PassageIndex for VerseStore {
    fn search<'a>(
        &'a self,
        query: &'a str,
        k: u64,
    ) -> BoxFuture<'a, Result<Vec<PassageHit>, BackendError>> {
        Box::pin(async move { Ok(VerseStore::search(self, query, k).await?) })
    }
}
