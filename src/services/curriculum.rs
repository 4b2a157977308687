//! Curriculum service
//!
//! Lists curriculums and manages the optional `max_credits` cap.

use crate::db::repositories::CurriculumRepository;
use crate::models::Curriculum;
use anyhow::Context;
use std::sync::Arc;

#[derive(Debug, thiserror::Error)]
pub enum CurriculumServiceError {
    #[error("Curriculum not found: {0}")]
    NotFound(i64),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct CurriculumService {
    repo: Arc<dyn CurriculumRepository>,
}

impl CurriculumService {
    pub fn new(repo: Arc<dyn CurriculumRepository>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<Curriculum>, CurriculumServiceError> {
        self.repo
            .list()
            .await
            .context("Failed to list curriculums")
            .map_err(Into::into)
    }

    pub async fn create(
        &self,
        name: &str,
        max_credits: Option<i32>,
    ) -> Result<Curriculum, CurriculumServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CurriculumServiceError::ValidationError(
                "Curriculum name cannot be empty".to_string(),
            ));
        }
        validate_max_credits(max_credits)?;

        self.repo
            .create(&Curriculum::new(name.to_string(), max_credits))
            .await
            .context("Failed to create curriculum")
            .map_err(Into::into)
    }

    /// Set the credit cap, or clear it with `None`
    pub async fn set_max_credits(
        &self,
        id: i64,
        max_credits: Option<i32>,
    ) -> Result<Curriculum, CurriculumServiceError> {
        validate_max_credits(max_credits)?;

        let found = self
            .repo
            .set_max_credits(id, max_credits)
            .await
            .context("Failed to set max credits")?;
        if !found {
            return Err(CurriculumServiceError::NotFound(id));
        }

        tracing::info!(curriculum_id = id, ?max_credits, "Curriculum credit cap updated");

        self.repo
            .get_by_id(id)
            .await
            .context("Failed to reload curriculum")?
            .ok_or(CurriculumServiceError::NotFound(id))
    }
}

fn validate_max_credits(max_credits: Option<i32>) -> Result<(), CurriculumServiceError> {
    match max_credits {
        Some(n) if n < 0 => Err(CurriculumServiceError::ValidationError(format!(
            "max_credits must not be negative, got {}",
            n
        ))),
        _ => Ok(()),
    }
}
