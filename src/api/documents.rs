//! Document review endpoints

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Document, DocumentStatus, ReviewAction};

#[derive(Debug, Deserialize)]
pub struct ListDocumentsQuery {
    pub status: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<Document>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_documents))
        .route("/{id}", get(get_document))
        .route("/{id}/approve", post(approve_document))
        .route("/{id}/reject", post(reject_document))
}

/// GET /api/documents?status=pending
async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<Json<DocumentListResponse>, ApiError> {
    let status = match query.status.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<DocumentStatus>().map_err(|_| {
            ApiError::validation_error(format!(
                "Unknown status '{}', expected pending, approved or rejected",
                raw
            ))
        })?),
        None => None,
    };

    let documents = state.review_service.list(status).await?;
    Ok(Json(DocumentListResponse { documents }))
}

/// GET /api/documents/{id}
async fn get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.review_service.get(&id).await?))
}

/// POST /api/documents/{id}/approve
async fn approve_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.review_service.review(&id, ReviewAction::Approve).await?))
}

/// POST /api/documents/{id}/reject
async fn reject_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.review_service.review(&id, ReviewAction::Reject).await?))
}
