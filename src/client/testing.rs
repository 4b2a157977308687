//! In-process [`ReviewApi`] double

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{ClientError, ReviewApi};
use crate::models::{AdminStats, Document, DocumentStatus};

#[derive(Default)]
pub struct FakeReviewApi {
    calls: Mutex<Vec<String>>,
    stats_calls: AtomicUsize,
    stats_delay: Duration,
    fail_stats: AtomicBool,
    fail_actions: AtomicBool,
}

impl FakeReviewApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stats_delay(mut self, delay: Duration) -> Self {
        self.stats_delay = delay;
        self
    }

    pub fn fail_stats(&self, fail: bool) {
        self.fail_stats.store(fail, Ordering::SeqCst);
    }

    pub fn fail_actions(&self, fail: bool) {
        self.fail_actions.store(fail, Ordering::SeqCst);
    }

    /// Review actions received, as `action:id`
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn stats_calls(&self) -> usize {
        self.stats_calls.load(Ordering::SeqCst)
    }

    fn act(&self, action: &str, id: &str, status: DocumentStatus) -> Result<Document, ClientError> {
        self.calls.lock().unwrap().push(format!("{}:{}", action, id));
        if self.fail_actions.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: 409,
                code: "CONFLICT".to_string(),
                message: format!("Document {} is already reviewed", id),
            });
        }
        let mut doc = Document::new("Week 1".to_string(), "Ana".to_string());
        doc.id = id.to_string();
        doc.status = status;
        Ok(doc)
    }
}

#[async_trait]
impl ReviewApi for FakeReviewApi {
    async fn approve(&self, document_id: &str) -> Result<Document, ClientError> {
        self.act("approve", document_id, DocumentStatus::Approved)
    }

    async fn reject(&self, document_id: &str) -> Result<Document, ClientError> {
        self.act("reject", document_id, DocumentStatus::Rejected)
    }

    async fn get_stats(&self) -> Result<AdminStats, ClientError> {
        let call = self.stats_calls.fetch_add(1, Ordering::SeqCst) as i64;
        if !self.stats_delay.is_zero() {
            tokio::time::sleep(self.stats_delay).await;
        }
        if self.fail_stats.load(Ordering::SeqCst) {
            return Err(ClientError::Rejected {
                status: 500,
                code: "INTERNAL_ERROR".to_string(),
                message: "Internal server error".to_string(),
            });
        }
        Ok(AdminStats::from_counts([(DocumentStatus::Pending, call + 1)]))
    }
}
