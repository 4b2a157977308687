//! Shared API state and error type
//!
//! Every handler returns `Result<_, ApiError>`. Errors render as
//! `{"error": {"code": "...", "message": "..."}}` and the code picks the
//! HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::db::DynDatabasePool;
use crate::services::{
    CurriculumService, CurriculumServiceError, ReviewService, ReviewServiceError,
};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pool: DynDatabasePool,
    pub review_service: Arc<ReviewService>,
    pub curriculum_service: Arc<CurriculumService>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new("NOT_FOUND", message)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "VALIDATION_ERROR" => StatusCode::BAD_REQUEST,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

impl From<ReviewServiceError> for ApiError {
    fn from(err: ReviewServiceError) -> Self {
        match err {
            ReviewServiceError::NotFound(id) => {
                ApiError::not_found(format!("Document {} not found", id))
            }
            ReviewServiceError::InvalidTransition { id, from, to } => ApiError::with_details(
                "CONFLICT",
                format!("Document {} is already {} and cannot become {}", id, from, to),
                serde_json::json!({ "status": from, "requested": to }),
            ),
            ReviewServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            ReviewServiceError::InternalError(e) => {
                tracing::error!("Review service failure: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

impl From<CurriculumServiceError> for ApiError {
    fn from(err: CurriculumServiceError) -> Self {
        match err {
            CurriculumServiceError::NotFound(id) => {
                ApiError::not_found(format!("Curriculum {} not found", id))
            }
            CurriculumServiceError::ValidationError(msg) => ApiError::validation_error(msg),
            CurriculumServiceError::InternalError(e) => {
                tracing::error!("Curriculum service failure: {:#}", e);
                ApiError::internal_error("Internal server error")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentStatus;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::not_found("x").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::new("CONFLICT", "x").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::validation_error("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::internal_error("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(ApiError::new("SOMETHING_ELSE", "x").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_invalid_transition_maps_to_conflict() {
        let err: ApiError = ReviewServiceError::InvalidTransition {
            id: "42".to_string(),
            from: DocumentStatus::Approved,
            to: DocumentStatus::Rejected,
        }
        .into();

        assert_eq!(err.error.code, "CONFLICT");
        assert_eq!(
            err.error.details,
            Some(serde_json::json!({ "status": "approved", "requested": "rejected" }))
        );
    }

    #[test]
    fn test_internal_errors_hide_details() {
        let err: ApiError = ReviewServiceError::InternalError(anyhow::anyhow!("disk on fire")).into();
        assert_eq!(err.error.code, "INTERNAL_ERROR");
        assert!(!err.error.message.contains("disk"));
    }

    #[test]
    fn test_error_body_shape() {
        let json = serde_json::to_value(ApiError::not_found("Document 7 not found")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "error": { "code": "NOT_FOUND", "message": "Document 7 not found" } })
        );
    }
}
