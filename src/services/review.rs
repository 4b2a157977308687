//! Review service
//!
//! Owns the document review workflow: a pending document can be approved
//! or rejected once, after which it is terminal. Admin statistics and
//! document listings are cached and dropped whenever a transition lands.

use crate::cache::{CacheLayer, MemoryCache};
use crate::db::repositories::DocumentRepository;
use crate::models::{AdminStats, CreateDocumentInput, Document, DocumentStatus, ReviewAction};
use anyhow::Context;
use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const CACHE_KEY_ADMIN_STATS: &str = "admin:stats";
const CACHE_KEY_DOCUMENT_LIST: &str = "documents:list:";

#[derive(Debug, thiserror::Error)]
pub enum ReviewServiceError {
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The document is not in a state the requested action applies to
    #[error("Cannot move document {id} from {from} to {to}")]
    InvalidTransition {
        id: String,
        from: DocumentStatus,
        to: DocumentStatus,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}

pub struct ReviewService {
    repo: Arc<dyn DocumentRepository>,
    cache: Arc<MemoryCache>,
    cache_ttl: Duration,
    /// Bumped on every invalidation; cached reads computed under an older
    /// value are discarded
    generation: AtomicU64,
}

impl ReviewService {
    pub fn new(repo: Arc<dyn DocumentRepository>, cache: Arc<MemoryCache>) -> Self {
        let cache_ttl = cache.default_ttl();
        Self {
            repo,
            cache,
            cache_ttl,
            generation: AtomicU64::new(0),
        }
    }

    /// Store a new pending document.
    ///
    /// Students submit through a separate application; this entry point
    /// exists for seeding and tests.
    pub async fn submit(&self, input: CreateDocumentInput) -> Result<Document, ReviewServiceError> {
        let title = input.title.trim();
        if title.is_empty() {
            return Err(ReviewServiceError::ValidationError(
                "Document title cannot be empty".to_string(),
            ));
        }

        let document = Document::new(title.to_string(), input.student_name.trim().to_string());
        let created = self
            .repo
            .create(&document)
            .await
            .context("Failed to create document")?;

        self.invalidate_caches().await;
        Ok(created)
    }

    pub async fn get(&self, id: &str) -> Result<Document, ReviewServiceError> {
        self.repo
            .get_by_id(id)
            .await
            .context("Failed to get document")?
            .ok_or_else(|| ReviewServiceError::NotFound(id.to_string()))
    }

    /// List documents, newest first
    pub async fn list(&self, status: Option<DocumentStatus>) -> Result<Vec<Document>, ReviewServiceError> {
        let cache_key = format!(
            "{}{}",
            CACHE_KEY_DOCUMENT_LIST,
            status.map(DocumentStatus::as_str).unwrap_or("all")
        );
        if let Ok(Some(cached)) = self.cache.get::<Vec<Document>>(&cache_key).await {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let documents = self
            .repo
            .list(status)
            .await
            .context("Failed to list documents")?;

        self.store(&cache_key, &documents, generation).await;
        Ok(documents)
    }

    pub async fn approve(&self, id: &str) -> Result<Document, ReviewServiceError> {
        self.review(id, ReviewAction::Approve).await
    }

    pub async fn reject(&self, id: &str) -> Result<Document, ReviewServiceError> {
        self.review(id, ReviewAction::Reject).await
    }

    /// Apply a review action.
    ///
    /// The update is conditional on the status read here, so of two
    /// concurrent reviews of one document only the first one lands.
    pub async fn review(&self, id: &str, action: ReviewAction) -> Result<Document, ReviewServiceError> {
        let current = self.get(id).await?;
        let target = action.target_status();

        if !current.status.can_transition_to(target) {
            return Err(ReviewServiceError::InvalidTransition {
                id: id.to_string(),
                from: current.status,
                to: target,
            });
        }

        let applied = self
            .repo
            .update_status(id, current.status, target, Utc::now())
            .await
            .context("Failed to update document status")?;

        let updated = self.get(id).await?;
        if !applied {
            tracing::warn!(document_id = id, status = %updated.status, "Review lost a race with another reviewer");
            return Err(ReviewServiceError::InvalidTransition {
                id: id.to_string(),
                from: updated.status,
                to: target,
            });
        }

        self.invalidate_caches().await;
        tracing::info!(document_id = id, from = %current.status, to = %target, "Document reviewed");
        Ok(updated)
    }

    /// Per-status counts, served from cache while fresh
    pub async fn stats(&self) -> Result<AdminStats, ReviewServiceError> {
        if let Ok(Some(cached)) = self.cache.get::<AdminStats>(CACHE_KEY_ADMIN_STATS).await {
            return Ok(cached);
        }

        let generation = self.generation.load(Ordering::Acquire);
        let counts = self
            .repo
            .count_by_status()
            .await
            .context("Failed to count documents")?;
        let stats = AdminStats::from_counts(counts);

        self.store(CACHE_KEY_ADMIN_STATS, &stats, generation).await;
        Ok(stats)
    }

    /// Cache a value read under `generation`.
    ///
    /// Writing first and checking afterwards means an invalidation racing
    /// with this call either sees the entry or is seen by the check.
    async fn store<T: Serialize + Send + Sync>(&self, key: &str, value: &T, generation: u64) {
        let _ = self.cache.set(key, value, self.cache_ttl).await;
        if self.generation.load(Ordering::Acquire) != generation {
            tracing::debug!(key, "Discarding cache entry computed before a review");
            let _ = self.cache.delete(key).await;
        }
    }

    async fn invalidate_caches(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        let _ = self.cache.delete(CACHE_KEY_ADMIN_STATS).await;
        let _ = self
            .cache
            .delete_pattern(&format!("{}*", CACHE_KEY_DOCUMENT_LIST))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::SqlxDocumentRepository;
    use crate::db::{create_test_pool, migrations};
    use async_trait::async_trait;
    use chrono::DateTime;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Notify;

    async fn document_repo() -> Arc<dyn DocumentRepository> {
        let pool = create_test_pool().await.expect("Failed to create test pool");
        migrations::run_migrations(&pool).await.expect("Failed to run migrations");
        SqlxDocumentRepository::boxed(pool)
    }

    async fn setup() -> ReviewService {
        ReviewService::new(document_repo().await, Arc::new(MemoryCache::new()))
    }

    /// Delegates to a real repository. The first `count_by_status` reads the
    /// counts, signals `counted`, then holds them until `release` fires.
    struct GatedRepository {
        inner: Arc<dyn DocumentRepository>,
        armed: AtomicBool,
        counted: Notify,
        release: Notify,
    }

    #[async_trait]
    impl DocumentRepository for GatedRepository {
        async fn create(&self, document: &Document) -> anyhow::Result<Document> {
            self.inner.create(document).await
        }

        async fn get_by_id(&self, id: &str) -> anyhow::Result<Option<Document>> {
            self.inner.get_by_id(id).await
        }

        async fn list(&self, status: Option<DocumentStatus>) -> anyhow::Result<Vec<Document>> {
            self.inner.list(status).await
        }

        async fn update_status(
            &self,
            id: &str,
            from: DocumentStatus,
            to: DocumentStatus,
            reviewed_at: DateTime<Utc>,
        ) -> anyhow::Result<bool> {
            self.inner.update_status(id, from, to, reviewed_at).await
        }

        async fn count_by_status(&self) -> anyhow::Result<Vec<(DocumentStatus, i64)>> {
            let counts = self.inner.count_by_status().await?;
            if self.armed.swap(false, Ordering::SeqCst) {
                self.counted.notify_one();
                self.release.notified().await;
            }
            Ok(counts)
        }
    }

    async fn submit(service: &ReviewService, title: &str) -> Document {
        service
            .submit(CreateDocumentInput {
                title: title.to_string(),
                student_name: "Ana Souza".to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_approve_pending_document() {
        let service = setup().await;
        let doc = submit(&service, "Week 1").await;

        let approved = service.approve(&doc.id).await.unwrap();
        assert_eq!(approved.status, DocumentStatus::Approved);
        assert!(approved.reviewed_at.is_some());
    }

    #[tokio::test]
    async fn test_reject_pending_document() {
        let service = setup().await;
        let doc = submit(&service, "Week 2").await;

        let rejected = service.reject(&doc.id).await.unwrap();
        assert_eq!(rejected.status, DocumentStatus::Rejected);
    }

    #[tokio::test]
    async fn test_terminal_documents_cannot_be_reviewed_again() {
        let service = setup().await;
        let doc = submit(&service, "Week 3").await;
        service.approve(&doc.id).await.unwrap();

        let err = service.reject(&doc.id).await.unwrap_err();
        assert!(matches!(
            err,
            ReviewServiceError::InvalidTransition {
                from: DocumentStatus::Approved,
                to: DocumentStatus::Rejected,
                ..
            }
        ));

        let err = service.approve(&doc.id).await.unwrap_err();
        assert!(matches!(err, ReviewServiceError::InvalidTransition { .. }));
        assert_eq!(service.get(&doc.id).await.unwrap().status, DocumentStatus::Approved);
    }

    #[tokio::test]
    async fn test_unknown_document() {
        let service = setup().await;
        let err = service.approve("does-not-exist").await.unwrap_err();
        assert!(matches!(err, ReviewServiceError::NotFound(id) if id == "does-not-exist"));
    }

    #[tokio::test]
    async fn test_submit_requires_title() {
        let service = setup().await;
        let err = service
            .submit(CreateDocumentInput {
                title: "   ".to_string(),
                student_name: "Ana".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ReviewServiceError::ValidationError(_)));
    }

    #[tokio::test]
    async fn test_stats_reflect_transitions_immediately() {
        let service = setup().await;
        let a = submit(&service, "A").await;
        let b = submit(&service, "B").await;
        submit(&service, "C").await;

        let before = service.stats().await.unwrap();
        assert_eq!((before.total, before.pending), (3, 3));

        service.approve(&a.id).await.unwrap();
        service.reject(&b.id).await.unwrap();

        let after = service.stats().await.unwrap();
        assert_eq!(after.total, 3);
        assert_eq!(after.pending, 1);
        assert_eq!(after.approved, 1);
        assert_eq!(after.rejected, 1);
    }

    #[tokio::test]
    async fn test_list_cache_dropped_after_review() {
        let service = setup().await;
        let doc = submit(&service, "Week 4").await;

        let pending = service.list(Some(DocumentStatus::Pending)).await.unwrap();
        assert_eq!(pending.len(), 1);

        service.approve(&doc.id).await.unwrap();

        assert!(service.list(Some(DocumentStatus::Pending)).await.unwrap().is_empty());
        assert_eq!(service.list(Some(DocumentStatus::Approved)).await.unwrap().len(), 1);
        assert_eq!(service.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_reviews_only_one_wins() {
        let service = Arc::new(setup().await);
        let doc = submit(&service, "Contested").await;

        let (approve, reject) = tokio::join!(service.approve(&doc.id), service.reject(&doc.id));
        assert_eq!(
            approve.is_ok() as u8 + reject.is_ok() as u8,
            1,
            "exactly one review should succeed"
        );

        let stats = service.stats().await.unwrap();
        assert_eq!(stats.pending, 0);
        assert_eq!(stats.approved + stats.rejected, 1);
    }

    #[tokio::test]
    async fn test_stats_read_before_a_review_is_not_cached() {
        let repo = Arc::new(GatedRepository {
            inner: document_repo().await,
            armed: AtomicBool::new(false),
            counted: Notify::new(),
            release: Notify::new(),
        });
        let service = Arc::new(ReviewService::new(repo.clone(), Arc::new(MemoryCache::new())));
        let doc = submit(&service, "Week 5").await;
        repo.armed.store(true, Ordering::SeqCst);

        let slow_stats = tokio::spawn({
            let service = service.clone();
            async move { service.stats().await }
        });
        repo.counted.notified().await;
        service.approve(&doc.id).await.unwrap();
        repo.release.notify_one();

        let raced = slow_stats.await.unwrap().unwrap();
        assert_eq!((raced.pending, raced.approved), (1, 0));

        let fresh = service.stats().await.unwrap();
        assert_eq!((fresh.pending, fresh.approved), (0, 1));
    }

    #[tokio::test]
    async fn test_list_read_before_a_review_is_not_cached() {
        let service = setup().await;
        let doc = submit(&service, "Week 6").await;

        let generation = service.generation.load(Ordering::Acquire);
        let listed = service.list(Some(DocumentStatus::Pending)).await.unwrap();
        service.approve(&doc.id).await.unwrap();
        // Late write of the listing computed before the approval
        let key = format!("{}{}", CACHE_KEY_DOCUMENT_LIST, DocumentStatus::Pending.as_str());
        service.store(&key, &listed, generation).await;

        assert!(service.list(Some(DocumentStatus::Pending)).await.unwrap().is_empty());
    }
}
