use std::{env, sync::Arc, time::Duration};

mod core;
mod error_handler;
mod middleware_layer;
mod routes;

pub use crate::core::app_state::AppState;
pub use crate::error_handler::{AppError, AppResult};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use tokio::signal;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};
use tracing::{info, warn};

use crate::{
    middleware_layer::json_extractor::json_error_mapper,
    routes::{gita::ask_gita_route::ask_gita, health::health_route::health},
};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Builds the HTTP router over an already initialized state.
pub fn router(state: Arc<AppState>, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/gita", post(ask_gita))
        .route("/health", get(health))
        .layer(middleware::from_fn(json_error_mapper))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(cors)
        .with_state(state)
}

/// Serves until Ctrl+C.
///
/// Reads `API_ADDRESS` (required) and `REQUEST_TIMEOUT_SECS` (default 120).
/// The verse index must be built before calling this.
pub async fn start(state: AppState) -> Result<(), AppError> {
    let host_url = env::var("API_ADDRESS").map_err(|_| AppError::MissingEnv("API_ADDRESS"))?;
    let timeout_secs = match env::var("REQUEST_TIMEOUT_SECS") {
        Ok(v) => v
            .trim()
            .parse::<u64>()
            .map_err(|_| AppError::InvalidEnv("REQUEST_TIMEOUT_SECS", v))?,
        Err(_) => DEFAULT_REQUEST_TIMEOUT_SECS,
    };

    let app = router(Arc::new(state), Duration::from_secs(timeout_secs));

    let listener = tokio::net::TcpListener::bind(&host_url)
        .await
        .map_err(AppError::Bind)?;
    info!(address = %host_url, timeout_secs, "api listening");

    // Start server with graceful shutdown on Ctrl+C
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(AppError::Server)?;

    info!("api stopped");
    Ok(())
}

/// Resolves when Ctrl+C is pressed.
async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
