//! Admin client for the review API
//!
//! - [`ReviewClient`]: typed HTTP calls against a running server
//! - [`StatsQuery`]: the `adminStats` query cache with request deduplication
//! - [`ReviewActions`]: approve/reject that keep `adminStats` fresh
//!
//! Anything implementing [`ReviewApi`] can stand in for the HTTP client,
//! which is how the query and action layers are tested.

pub mod actions;
pub mod http;
pub mod query;

#[cfg(test)]
mod testing;

use async_trait::async_trait;

use crate::models::{AdminStats, Document};

pub use actions::ReviewActions;
pub use http::ReviewClient;
pub use query::{StatsQuery, StatsQueryError, ADMIN_STATS_KEY};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Document id must not be empty, \".\" or \"..\"")]
    InvalidDocumentId,

    #[error("Invalid base URL: {0}")]
    InvalidBaseUrl(String),

    /// The server answered with a non-success status
    #[error("Server rejected request ({status} {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    /// Connection failure, timeout or undecodable body
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl ClientError {
    /// Error code reported by the server, if the server answered
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Request(e) if e.is_timeout())
    }
}

/// Operations the admin front end performs against the review server
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// `POST /api/documents/{id}/approve`
    async fn approve(&self, document_id: &str) -> Result<Document, ClientError>;

    /// `POST /api/documents/{id}/reject`
    async fn reject(&self, document_id: &str) -> Result<Document, ClientError>;

    /// `GET /api/admin/stats`
    async fn get_stats(&self) -> Result<AdminStats, ClientError>;
}
