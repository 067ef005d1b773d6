use crate::{
    AppState,
    api::{auth, chat, files, oauth},
    health,
};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

/// Room for multipart boundaries and headers on top of the file itself
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Conversation histories can be long
const JSON_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Build the application router with all endpoints
pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.upload_config.max_bytes + MULTIPART_OVERHEAD;
    let static_dir = state.static_dir.clone();

    let router = Router::new()
        // Auth
        .route("/api/send-otp", post(auth::send_otp))
        .route("/api/verify-otp", post(auth::verify_otp))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/auth/google", get(oauth::google_start))
        .route("/api/auth/google/callback", get(oauth::google_callback))
        // Chat
        .route("/api/send-message", post(chat::send_message))
        // Files
        .route(
            "/api/upload",
            post(files::upload).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route("/api/file-content/{filename}", get(files::file_content))
        // Health check endpoints
        .route("/health", get(health::health_check))
        .route("/live", get(health::liveness_check))
        .route("/ready", get(health::readiness_check))
        .route("/metrics", get(health::metrics))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router,
    };

    router.with_state(state).layer(
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}
