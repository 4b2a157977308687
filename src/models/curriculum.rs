//! Curriculum model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A curriculum with an optional maximum credit cap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curriculum {
    pub id: i64,
    pub name: String,
    /// `None` means no cap is enforced
    pub max_credits: Option<i32>,
    pub created_at: DateTime<Utc>,
}

impl Curriculum {
    pub fn new(name: String, max_credits: Option<i32>) -> Self {
        Self {
            id: 0,
            name,
            max_credits,
            created_at: Utc::now(),
        }
    }
}

/// Input for setting or clearing the credit cap
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMaxCreditsInput {
    pub max_credits: Option<i32>,
}
