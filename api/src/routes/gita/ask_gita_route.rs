//! POST /api/gita — answers a question with explained verses.

use std::{sync::Arc, time::Instant};

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use tracing::{debug, info};

use crate::{
    core::{app_state::AppState, http::response_envelope::ApiResponse},
    error_handler::{AppError, AppResult},
    routes::gita::ask_gita_request::{AskGitaRequest, AskGitaResponse},
};

/// Handler: POST /api/gita
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8080/api/gita \
///   -H 'content-type: application/json' \
///   -d '{"question":"What does Krishna say about doing one'\''s duty?"}'
/// ```
pub async fn ask_gita(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<AskGitaRequest>,
) -> AppResult<Response> {
    let request_id = headers
        .get("X-Request-Id")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("-");

    let question = body.question.trim();
    if question.is_empty() {
        return Err(AppError::BadRequest("question must not be empty".into()));
    }
    debug!(%request_id, %question, "ask_gita: start");

    let started = Instant::now();
    let verses = state.pipeline.ask(question).await?;

    info!(
        %request_id,
        verses = verses.len(),
        latency_ms = started.elapsed().as_millis(),
        "ask_gita: done"
    );
    Ok(ApiResponse::success(AskGitaResponse { verses }).into_response_with_status(StatusCode::OK))
}
