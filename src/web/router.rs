//! Router configuration for the file API.

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_entry, delete_entry, delete_root, download_file, list_directory, list_root,
    list_uploads, read_for_edit, save_file, upload_file, view_file, AppState,
};
use super::middleware::{create_cors_layer, security_headers};
use crate::config::WebConfig;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, config: &WebConfig) -> Router {
    let api_routes = Router::new()
        .route("/list", get(list_root))
        .route("/list/", get(list_root))
        .route("/list/*path", get(list_directory))
        .route("/edit/*path", get(read_for_edit))
        .route("/save/*path", post(save_file))
        .route("/create", post(create_entry))
        .route("/delete/", post(delete_root))
        .route("/delete/*path", post(delete_entry))
        .route("/download/*path", get(download_file))
        .route("/upload", post(upload_file))
        .route("/uploads", get(list_uploads));

    let body_limit = if config.max_upload_size_mb == 0 {
        DefaultBodyLimit::disable()
    } else {
        let bytes = config.max_upload_size_mb.saturating_mul(1024 * 1024);
        DefaultBodyLimit::max(usize::try_from(bytes).unwrap_or(usize::MAX))
    };

    Router::new()
        .nest("/api", api_routes)
        .route("/files/*path", get(view_file))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(&config.cors_origins))
                .layer(middleware::from_fn(security_headers))
                .layer(body_limit),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}
