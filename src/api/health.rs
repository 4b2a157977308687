//! Liveness endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::time::Duration;

use crate::api::middleware::AppState;
use crate::config::DatabaseDriver;

const PING_TIMEOUT: Duration = Duration::from_secs(5);

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: DatabaseDriver,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// GET /api/health
///
/// 200 while the database answers a ping, 503 otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let error = match tokio::time::timeout(PING_TIMEOUT, state.pool.ping()).await {
        Ok(Ok(())) => None,
        Ok(Err(e)) => Some(format!("{:#}", e)),
        Err(_) => Some(format!("Ping timed out after {}s", PING_TIMEOUT.as_secs())),
    };

    let status = if error.is_none() {
        StatusCode::OK
    } else {
        tracing::warn!(error = ?error, "Health check failed");
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(HealthResponse {
            status: if error.is_none() { "ok" } else { "unavailable" },
            database: state.pool.driver(),
            error,
        }),
    )
}
