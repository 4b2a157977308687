//! Services layer - Business logic
//!
//! Services implement the review workflow and curriculum rules on top of
//! the repositories and the cache.

pub mod curriculum;
pub mod review;

pub use curriculum::{CurriculumService, CurriculumServiceError};
pub use review::{ReviewService, ReviewServiceError, CACHE_KEY_ADMIN_STATS};
