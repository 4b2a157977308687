//! Curriculum endpoints

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::api::middleware::{ApiError, AppState};
use crate::models::{Curriculum, UpdateMaxCreditsInput};

#[derive(Debug, Serialize, Deserialize)]
pub struct CurriculumListResponse {
    pub curriculums: Vec<Curriculum>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_curriculums))
        .route("/{id}/max-credits", put(set_max_credits))
}

async fn list_curriculums(
    State(state): State<AppState>,
) -> Result<Json<CurriculumListResponse>, ApiError> {
    let curriculums = state.curriculum_service.list().await?;
    Ok(Json(CurriculumListResponse { curriculums }))
}

/// PUT /api/curriculums/{id}/max-credits with `{"max_credits": 120}` or `{"max_credits": null}`
async fn set_max_credits(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<UpdateMaxCreditsInput>,
) -> Result<Json<Curriculum>, ApiError> {
    let curriculum = state
        .curriculum_service
        .set_max_credits(id, input.max_credits)
        .await?;
    Ok(Json(curriculum))
}
