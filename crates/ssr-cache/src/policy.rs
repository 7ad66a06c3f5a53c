//! Render cache bounds.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use ssr_core::RenderMode;

use crate::cache::{CacheError, CacheResult};

/// Entry bound used in production.
pub const DEFAULT_MAX_ENTRIES: u64 = 1000;

/// Entry lifetime used in production.
pub const DEFAULT_TTL: Duration = Duration::from_secs(15 * 60);

/// Bounds for the render-result cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderCachePolicy {
    /// Whether the engine gets a cache at all.
    pub enabled: bool,
    /// Maximum number of cached entries.
    pub max_entries: u64,
    /// Time-to-live for each entry.
    pub ttl: Duration,
}

impl RenderCachePolicy {
    /// 1000 entries, 15 minutes.
    pub fn production() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }

    /// No cache; every render hits the engine.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::production()
        }
    }

    /// Policy for a render mode. Development renders are never cached.
    pub fn for_mode(mode: RenderMode) -> Self {
        match mode {
            RenderMode::Development => Self::disabled(),
            RenderMode::Production => Self::production(),
        }
    }

    pub fn with_max_entries(mut self, max_entries: u64) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Check the bounds of an enabled policy.
    pub fn validate(&self) -> CacheResult<()> {
        if !self.enabled {
            return Ok(());
        }
        if self.max_entries == 0 {
            return Err(CacheError::InvalidPolicy("max_entries must be > 0".into()));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::InvalidPolicy("ttl must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for RenderCachePolicy {
    fn default() -> Self {
        Self::production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_bounds() {
        let policy = RenderCachePolicy::for_mode(RenderMode::Production);

        assert!(policy.enabled);
        assert_eq!(policy.max_entries, 1000);
        assert_eq!(policy.ttl, Duration::from_secs(900));
    }

    #[test]
    fn test_development_disabled() {
        let policy = RenderCachePolicy::for_mode(RenderMode::Development);

        assert!(!policy.enabled);
        assert!(policy.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_bounds() {
        assert!(RenderCachePolicy::production().with_max_entries(0).validate().is_err());
        assert!(RenderCachePolicy::production()
            .with_ttl(Duration::ZERO)
            .validate()
            .is_err());
        assert!(RenderCachePolicy::disabled().with_max_entries(0).validate().is_ok());
    }
}
