use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use verbum_core::ai::proxy::InfoRequest;
use verbum_core::CommentaryBackend;

/// Largest accepted `/api/get-info` body
const MAX_PROMPT_BYTES: usize = 64 * 1024;

pub struct AppState {
    pub backend: Arc<dyn CommentaryBackend>,
}

async fn health() -> &'static str {
    "ok"
}

/// Forwards the prompt and returns the completion text verbatim
async fn get_info(
    State(state): State<Arc<AppState>>,
    Json(req): Json<InfoRequest>,
) -> Result<String, (StatusCode, &'static str)> {
    state.backend.complete(&req.prompt).await.map_err(|e| {
        tracing::error!(error = %e, "commentary provider failed");
        (StatusCode::BAD_GATEWAY, "commentary unavailable")
    })
}

pub fn router(state: Arc<AppState>, bibles_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/get-info", post(get_info))
        .layer(RequestBodyLimitLayer::new(MAX_PROMPT_BYTES))
        .with_state(state);

    Router::new()
        .route("/health", get(health))
        .nest_service("/bibles", ServeDir::new(bibles_dir))
        .merge(api)
        .layer(cors)
}
