//! HTTP inbound adapter.

pub mod auth;
pub mod error;
mod handlers;

use crate::application::IngestService;
use auth::JwtAuth;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub ingest: IngestService,
    pub auth: Arc<JwtAuth>,
}

/// Request body ceilings, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub video: usize,
    pub thumbnail: usize,
}

pub fn router(state: AppState, limits: UploadLimits) -> Router {
    Router::new()
        .route(
            "/api/video_upload/:video_id",
            post(handlers::upload_video).layer(DefaultBodyLimit::max(limits.video)),
        )
        .route(
            "/api/thumbnail_upload/:video_id",
            post(handlers::upload_thumbnail).layer(DefaultBodyLimit::max(limits.thumbnail)),
        )
        .route("/api/healthz", get(|| async { "ok" }))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
