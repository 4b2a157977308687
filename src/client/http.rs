//! reqwest-backed [`ReviewApi`]

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::{ClientError, ReviewApi};
use crate::api::ApiError;
use crate::config::ClientConfig;
use crate::models::{AdminStats, Document, ReviewAction};

pub struct ReviewClient {
    http: Client,
    base_url: Url,
}

impl ReviewClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::InvalidBaseUrl(format!("{}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }

        let http = Client::builder()
            .user_agent(concat!("logbook-admin/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(&config.base_url, config.timeout())
    }

    /// Build `{base}/api/{segments...}`; each segment is percent-encoded
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .push("api")
            .extend(segments);
        Ok(url)
    }

    /// `{base}/api/documents/{id}/{action}`
    ///
    /// `.` and `..` would be resolved away as dot segments and the request
    /// would land on another resource, so they are refused like an empty id.
    fn review_endpoint(&self, document_id: &str, action: ReviewAction) -> Result<Url, ClientError> {
        if matches!(document_id, "" | "." | "..") {
            return Err(ClientError::InvalidDocumentId);
        }
        self.endpoint(&["documents", document_id, action.path_segment()])
    }

    async fn review(&self, document_id: &str, action: ReviewAction) -> Result<Document, ClientError> {
        let url = self.review_endpoint(document_id, action)?;
        tracing::debug!(%url, "Sending review action");

        let response = self.http.post(url).send().await?;
        decode(response).await
    }
}

/// Decode a success body, or turn an error body into [`ClientError::Rejected`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }

    let text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            tracing::debug!(%status, "Failed to read error body: {}", e);
            String::new()
        }
    };
    let (code, message) = match serde_json::from_str::<ApiError>(&text) {
        Ok(err) => (err.error.code, err.error.message),
        Err(_) => (
            status.canonical_reason().unwrap_or("UNKNOWN").to_uppercase().replace(' ', "_"),
            text,
        ),
    };

    Err(ClientError::Rejected {
        status: status.as_u16(),
        code,
        message,
    })
}

#[async_trait]
impl ReviewApi for ReviewClient {
    async fn approve(&self, document_id: &str) -> Result<Document, ClientError> {
        self.review(document_id, ReviewAction::Approve).await
    }

    async fn reject(&self, document_id: &str) -> Result<Document, ClientError> {
        self.review(document_id, ReviewAction::Reject).await
    }

    async fn get_stats(&self) -> Result<AdminStats, ClientError> {
        let url = self.endpoint(&["admin", "stats"])?;
        let response = self.http.get(url).send().await?;
        decode(response).await
    }
}
