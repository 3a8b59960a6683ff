use axum::{http::StatusCode, routing::get, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::core::middleware;
use crate::features::files::{routes as files_routes, FileService};

async fn health_check() -> StatusCode {
    StatusCode::OK
}

/// API routes with CORS, request-id and tracing layers applied
pub fn build_router(file_service: Arc<FileService>, cors_allowed_origins: Vec<String>) -> Router {
    Router::new()
        .merge(files_routes(file_service))
        .route("/health", get(health_check))
        .layer(middleware::cors_layer(cors_allowed_origins))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid))
}
