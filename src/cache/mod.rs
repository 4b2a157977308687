//! Cache layer
//!
//! Services cache derived read models (admin statistics, document listings)
//! in a moka-backed in-memory cache. Values are stored as JSON so any
//! serde type can be cached behind a string key.
//!
//! ```rust,ignore
//! use logbook_admin::cache::{create_cache, CacheLayer};
//! use logbook_admin::config::CacheConfig;
//!
//! let cache = create_cache(&CacheConfig::default());
//! cache.set("admin:stats", &stats, cache.default_ttl()).await?;
//! ```

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;

pub use memory::MemoryCache;

/// Key-value cache with per-entry TTL.
///
/// The methods are generic over the cached type, so this trait is not
/// object safe; services hold a concrete `Arc<MemoryCache>`.
#[async_trait]
pub trait CacheLayer: Send + Sync {
    /// Get a value from cache
    async fn get<T: DeserializeOwned + Send>(&self, key: &str) -> Result<Option<T>>;

    /// Set a value in cache with TTL
    async fn set<T: Serialize + Send + Sync>(&self, key: &str, value: &T, ttl: Duration) -> Result<()>;

    /// Delete a value from cache
    async fn delete(&self, key: &str) -> Result<()>;

    /// Delete all values whose key matches a glob pattern (`*` and `?`)
    async fn delete_pattern(&self, pattern: &str) -> Result<()>;
}

/// Create the shared cache from configuration
pub fn create_cache(config: &CacheConfig) -> Arc<MemoryCache> {
    Arc::new(MemoryCache::with_capacity_and_ttl(
        config.max_capacity,
        Duration::from_secs(config.ttl_seconds),
    ))
}
