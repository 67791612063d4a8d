use ai_llm_service::health_service::HealthStatus;
use serde::Serialize;
use verse_store::IndexStats;

/// `data` of `GET /health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `true` when every LLM profile answered and the index is built.
    pub ready: bool,
    pub llm: Vec<HealthStatus>,
    /// `None` until the one-time index build finished.
    pub index: Option<IndexStats>,
}
