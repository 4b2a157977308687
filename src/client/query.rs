//! `adminStats` query cache
//!
//! Concurrent fetches within the freshness window share one in-flight
//! request and its result. Failed fetches are not cached.

use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{ClientError, ReviewApi};
use crate::models::AdminStats;

/// Cache key of the admin statistics query
pub const ADMIN_STATS_KEY: &str = "adminStats";

#[derive(Debug, Clone, thiserror::Error)]
#[error("adminStats query failed: {source}")]
pub struct StatsQueryError {
    #[source]
    source: Arc<ClientError>,
}

impl StatsQueryError {
    pub fn client_error(&self) -> &ClientError {
        &self.source
    }
}

/// Entries are keyed by generation. `invalidate` moves to a new generation,
/// so a fetch that was already in flight can only populate a retired key.
pub struct StatsQuery {
    api: Arc<dyn ReviewApi>,
    cache: Cache<u64, AdminStats>,
    generation: AtomicU64,
}

impl StatsQuery {
    pub fn new(api: Arc<dyn ReviewApi>, stale_time: Duration) -> Self {
        let cache = Cache::builder().max_capacity(4).time_to_live(stale_time).build();
        Self {
            api,
            cache,
            generation: AtomicU64::new(0),
        }
    }

    /// Cached stats while fresh, otherwise one shared call to `get_stats`
    pub async fn fetch(&self) -> Result<AdminStats, StatsQueryError> {
        let generation = self.generation.load(Ordering::Acquire);
        let api = self.api.clone();
        self.cache
            .try_get_with(generation, async move {
                tracing::debug!(key = ADMIN_STATS_KEY, generation, "Fetching admin stats");
                api.get_stats().await
            })
            .await
            .map_err(|source| {
                tracing::warn!("Admin stats fetch failed: {}", source);
                StatsQueryError { source }
            })
    }

    /// Drop the cached stats; the next `fetch` goes to the server even if an
    /// earlier fetch is still running
    pub async fn invalidate(&self) {
        let retired = self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate(&retired).await;
    }
}
