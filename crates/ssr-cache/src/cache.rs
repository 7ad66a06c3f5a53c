//! LRU + TTL render cache.

use std::sync::Arc;

use moka::sync::Cache;
use ssr_core::{RenderCache, RenderMode};

use crate::policy::RenderCachePolicy;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("invalid cache policy: {0}")]
    InvalidPolicy(String),
}

/// Status of a cache lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl std::fmt::Display for CacheStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hit => write!(f, "HIT"),
            Self::Miss => write!(f, "MISS"),
        }
    }
}

/// Render-result cache bounded by entry count and entry age.
///
/// Concurrent writes to the same key are last-write-wins.
#[derive(Clone)]
pub struct MokaRenderCache {
    inner: Cache<String, String>,
    policy: RenderCachePolicy,
}

impl MokaRenderCache {
    pub fn new(policy: RenderCachePolicy) -> CacheResult<Self> {
        policy.validate()?;

        let inner = Cache::builder()
            .max_capacity(policy.max_entries)
            .time_to_live(policy.ttl)
            .build();

        Ok(Self { inner, policy })
    }

    /// Cache for a render mode, `None` when the mode renders uncached.
    pub fn for_mode(mode: RenderMode) -> CacheResult<Option<Arc<dyn RenderCache>>> {
        let policy = RenderCachePolicy::for_mode(mode);
        if !policy.enabled {
            return Ok(None);
        }
        Ok(Some(Arc::new(Self::new(policy)?)))
    }

    pub fn policy(&self) -> &RenderCachePolicy {
        &self.policy
    }

    /// Look up a key, reporting hit or miss.
    pub fn lookup(&self, key: &str) -> (CacheStatus, Option<String>) {
        match self.inner.get(key) {
            Some(value) => (CacheStatus::Hit, Some(value)),
            None => (CacheStatus::Miss, None),
        }
    }

    /// Approximate number of live entries.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Apply pending evictions now.
    pub fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks();
    }
}

impl RenderCache for MokaRenderCache {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: String) {
        self.inner.insert(key.to_string(), value);
    }

    fn has(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }
}

impl std::fmt::Debug for MokaRenderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaRenderCache")
            .field("policy", &self.policy)
            .field("entries", &self.inner.entry_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    // === Lookup Tests ===

    #[test]
    fn test_set_then_get() {
        let cache = MokaRenderCache::new(RenderCachePolicy::production()).unwrap();

        assert_eq!(cache.lookup("/").0, CacheStatus::Miss);
        cache.set("/", "<html></html>".to_string());

        assert!(cache.has("/"));
        assert_eq!(
            cache.lookup("/"),
            (CacheStatus::Hit, Some("<html></html>".to_string()))
        );
    }

    #[test]
    fn test_last_write_wins() {
        let cache = MokaRenderCache::new(RenderCachePolicy::production()).unwrap();

        cache.set("/a", "one".to_string());
        cache.set("/a", "two".to_string());

        assert_eq!(cache.get("/a").as_deref(), Some("two"));
    }

    // === Bounds Tests ===

    #[test]
    fn test_evicts_beyond_entry_bound() {
        let cache =
            MokaRenderCache::new(RenderCachePolicy::production().with_max_entries(2)).unwrap();

        for i in 0..10 {
            cache.set(&format!("/page/{i}"), format!("page {i}"));
        }
        cache.run_pending_tasks();

        assert!(cache.entry_count() <= 2);
    }

    #[test]
    fn test_expires_after_ttl() {
        let cache = MokaRenderCache::new(
            RenderCachePolicy::production().with_ttl(Duration::from_millis(50)),
        )
        .unwrap();

        cache.set("/", "fresh".to_string());
        assert!(cache.get("/").is_some());

        std::thread::sleep(Duration::from_millis(120));

        assert!(cache.get("/").is_none());
    }

    // === Mode Tests ===

    #[test]
    fn test_for_mode() {
        assert!(MokaRenderCache::for_mode(RenderMode::Development)
            .unwrap()
            .is_none());
        assert!(MokaRenderCache::for_mode(RenderMode::Production)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_invalid_policy_rejected() {
        let result = MokaRenderCache::new(RenderCachePolicy::production().with_max_entries(0));

        assert!(matches!(result, Err(CacheError::InvalidPolicy(_))));
    }
}
