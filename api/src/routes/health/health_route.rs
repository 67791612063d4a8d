//! GET /health — LLM provider probes plus index readiness.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::Response};
use tracing::warn;

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    routes::health::health_response::HealthResponse,
};

pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let llm = state.llm.health_all().await;
    let index = state.store.index_stats().cloned();
    let ready = index.is_some() && llm.iter().all(|s| s.ok);

    if !ready {
        warn!(
            index_ready = index.is_some(),
            llm_down = llm.iter().filter(|s| !s.ok).count(),
            "health: degraded"
        );
    }

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    ApiResponse::success(HealthResponse { ready, llm, index }).into_response_with_status(status)
}
