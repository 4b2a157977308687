//! API layer - HTTP handlers and routing
//!
//! - `/api/documents`: list, fetch, approve and reject logbook documents
//! - `/api/admin/stats`: document counts per review status
//! - `/api/curriculums`: curriculum listing and credit caps
//! - `/api/health`: database reachability

pub mod admin;
pub mod curriculums;
pub mod documents;
pub mod health;
pub mod middleware;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use middleware::{ApiError, AppState};

/// Build the `/api` routes
pub fn build_api_router() -> Router<AppState> {
    Router::new()
        .nest("/documents", documents::router())
        .nest("/admin", admin::router())
        .nest("/curriculums", curriculums::router())
        .nest("/health", health::router())
}

/// Build the complete router with middleware
pub fn build_router(state: AppState, cors_origin: &str) -> Result<Router> {
    let origin = cors_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("Invalid CORS origin: {}", cors_origin))?;

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    Ok(Router::new()
        .nest("/api", build_api_router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
