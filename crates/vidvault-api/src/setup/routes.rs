//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use vidvault_core::Config;

/// Setup all application routes
///
/// The body limit is enforced at the extractor level so oversized uploads
/// surface as a 413 on the multipart stream instead of an aborted connection.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/v0/videos", post(handlers::video_upload::upload_video))
        .route("/api/v0/videos/sign", get(handlers::video_sign::sign_video))
        .layer(DefaultBodyLimit::max(config.max_video_size_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
