//! Review actions that keep the `adminStats` query fresh

use std::sync::Arc;

use super::{ClientError, ReviewApi, StatsQuery};
use crate::models::{Document, ReviewAction};

pub struct ReviewActions {
    api: Arc<dyn ReviewApi>,
    stats: Arc<StatsQuery>,
}

impl ReviewActions {
    pub fn new(api: Arc<dyn ReviewApi>, stats: Arc<StatsQuery>) -> Self {
        Self { api, stats }
    }

    pub async fn approve(&self, document_id: &str) -> Result<Document, ClientError> {
        self.run(document_id, ReviewAction::Approve).await
    }

    pub async fn reject(&self, document_id: &str) -> Result<Document, ClientError> {
        self.run(document_id, ReviewAction::Reject).await
    }

    /// Perform the action; stats are invalidated only when it succeeds
    pub async fn run(&self, document_id: &str, action: ReviewAction) -> Result<Document, ClientError> {
        let result = match action {
            ReviewAction::Approve => self.api.approve(document_id).await,
            ReviewAction::Reject => self.api.reject(document_id).await,
        };

        match result {
            Ok(document) => {
                self.stats.invalidate().await;
                tracing::info!(document_id, status = %document.status, "Review action applied");
                Ok(document)
            }
            Err(e) => {
                tracing::warn!(document_id, action = action.path_segment(), "Review action failed: {}", e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::FakeReviewApi;
    use crate::models::DocumentStatus;
    use std::time::Duration;

    fn setup() -> (Arc<FakeReviewApi>, Arc<StatsQuery>, ReviewActions) {
        let api = Arc::new(FakeReviewApi::new());
        let stats = Arc::new(StatsQuery::new(api.clone(), Duration::from_secs(60)));
        let actions = ReviewActions::new(api.clone(), stats.clone());
        (api, stats, actions)
    }

    #[tokio::test]
    async fn test_approve_invalidates_stats() {
        let (api, stats, actions) = setup();
        stats.fetch().await.unwrap();

        let doc = actions.approve("42").await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Approved);
        assert_eq!(api.calls(), vec!["approve:42".to_string()]);

        assert_eq!(stats.fetch().await.unwrap().pending, 2);
        assert_eq!(api.stats_calls(), 2);
    }

    #[tokio::test]
    async fn test_reject_invalidates_stats() {
        let (api, stats, actions) = setup();
        stats.fetch().await.unwrap();

        let doc = actions.reject("7").await.unwrap();
        assert_eq!(doc.status, DocumentStatus::Rejected);
        assert_eq!(api.calls(), vec!["reject:7".to_string()]);

        stats.fetch().await.unwrap();
        assert_eq!(api.stats_calls(), 2);
    }

    #[tokio::test]
    async fn test_failed_action_keeps_stats() {
        let (api, stats, actions) = setup();
        stats.fetch().await.unwrap();
        api.fail_actions(true);

        let err = actions.approve("42").await.unwrap_err();
        assert_eq!(err.code(), Some("CONFLICT"));

        assert_eq!(stats.fetch().await.unwrap().pending, 1);
        assert_eq!(api.stats_calls(), 1);
    }
}
