use std::sync::Arc;

use ai_llm_service::LlmServiceProfiles;
use verse_pipeline::GitaPipeline;
use verse_store::VerseStore;

/// Shared state for all HTTP handlers. Built once at startup, read-only afterwards.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<GitaPipeline>,
    /// LLM profiles, used here for health probes.
    pub llm: Arc<LlmServiceProfiles>,
    /// Verse index, used here for readiness.
    pub store: Arc<VerseStore>,
}

impl AppState {
    pub fn new(
        pipeline: Arc<GitaPipeline>,
        llm: Arc<LlmServiceProfiles>,
        store: Arc<VerseStore>,
    ) -> Self {
        Self {
            pipeline,
            llm,
            store,
        }
    }
}
