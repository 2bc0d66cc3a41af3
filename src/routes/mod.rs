//! Router assembly: HTTP endpoints, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;

/// Build the application router with:
/// - REST-ish API under `/api/v1/...`
/// - Static SPA from `./static` with index fallback
/// - CORS (allow any origin/method/headers); tighten for production
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    // Static files with SPA fallback
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/levels", get(http::http_levels))
        .route("/api/v1/users/:user_id/dashboard", get(http::http_dashboard))
        .route("/api/v1/users/:user_id/progress/paths", get(http::http_progress_by_path))
        .route("/api/v1/users/:user_id/progress/difficulty", get(http::http_progress_by_difficulty))
        .route("/api/v1/users/:user_id/topics/completed", get(http::http_completed_topics))
        .route("/api/v1/users/:user_id/tiers/:tier", get(http::http_tier_completed))
        .route("/api/v1/users/:user_id/badges", get(http::http_user_badges))
        .route("/api/v1/users/:user_id/badges/award", post(http::http_award_badges))
        .route("/api/v1/users/:user_id/gamification", get(http::http_gamification))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
