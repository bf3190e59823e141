//! Short-lived cache in front of a tenant source
//!
//! With a TTL of zero the cache is a pass-through and every lookup reaches
//! the inner source. Otherwise `Found` and `Suspended` answers are kept per
//! slug until they expire or are invalidated; `NotFound` and errors are
//! never cached so a newly created tenant shows up on the next request.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use boxclub_core::{Result, TenantLookup, TenantSource};
use boxclub_observability::Metrics;

#[derive(Debug, Clone)]
struct CacheEntry {
    lookup: TenantLookup,
    expires_at: Instant,
}

/// TTL cache keyed by slug around another `TenantSource`
pub struct CachedTenantSource {
    inner: Arc<dyn TenantSource>,
    ttl: Duration,
    entries: DashMap<String, CacheEntry>,
    metrics: Option<Arc<Metrics>>,
}

impl CachedTenantSource {
    pub fn new(inner: Arc<dyn TenantSource>, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: DashMap::new(),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Drop the cached entry for `slug`; returns whether one existed
    pub fn invalidate(&self, slug: &str) -> bool {
        let removed = self.entries.remove(slug).is_some();
        if removed {
            debug!("Invalidated cached tenant '{}'", slug);
        }
        removed
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of entries held, including expired ones not yet evicted
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cached(&self, slug: &str) -> Option<TenantLookup> {
        let now = Instant::now();
        // Remove only if still expired, so a concurrent refresh survives
        if self
            .entries
            .remove_if(slug, |_, entry| entry.expires_at <= now)
            .is_some()
        {
            return None;
        }
        self.entries.get(slug).map(|entry| entry.lookup.clone())
    }
}

#[async_trait]
impl TenantSource for CachedTenantSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup_slug(&self, slug: &str) -> Result<TenantLookup> {
        if !self.is_enabled() {
            return self.inner.lookup_slug(slug).await;
        }

        if let Some(lookup) = self.cached(slug) {
            debug!("Tenant cache hit for '{}'", slug);
            if let Some(metrics) = &self.metrics {
                metrics.record_cache_hit();
            }
            return Ok(lookup);
        }

        if let Some(metrics) = &self.metrics {
            metrics.record_cache_miss();
        }

        let lookup = self.inner.lookup_slug(slug).await?;
        if !lookup.is_not_found() {
            self.entries.insert(
                slug.to_string(),
                CacheEntry {
                    lookup: lookup.clone(),
                    expires_at: Instant::now() + self.ttl,
                },
            );
        }
        Ok(lookup)
    }

    async fn lookup_domain(&self, host: &str) -> Result<TenantLookup> {
        self.inner.lookup_domain(host).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::tests::{MockSource, dynamic_tenant};

    fn cached(inner: Arc<MockSource>, ttl: Duration) -> CachedTenantSource {
        CachedTenantSource::new(inner, ttl)
    }

    #[tokio::test]
    async fn test_zero_ttl_passes_through() {
        let inner = Arc::new(MockSource::new());
        inner.insert("club", TenantLookup::found(dynamic_tenant("club")));
        let cache = cached(inner.clone(), Duration::ZERO);

        cache.lookup_slug("club").await.unwrap();
        cache.lookup_slug("club").await.unwrap();

        assert_eq!(inner.calls(), 2);
        assert!(cache.is_empty());
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_found_is_cached_until_invalidated() {
        let inner = Arc::new(MockSource::new());
        inner.insert("club", TenantLookup::found(dynamic_tenant("club")));
        let metrics = Arc::new(Metrics::new().unwrap());
        let cache = cached(inner.clone(), Duration::from_secs(60)).with_metrics(metrics);

        assert!(cache.lookup_slug("club").await.unwrap().is_found());
        assert!(cache.lookup_slug("club").await.unwrap().is_found());
        assert_eq!(inner.calls(), 1);

        assert!(cache.invalidate("club"));
        assert!(!cache.invalidate("club"));
        cache.lookup_slug("club").await.unwrap();
        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_suspended_is_cached() {
        let inner = Arc::new(MockSource::new());
        inner.insert("paused", TenantLookup::Suspended { message: None });
        let cache = cached(inner.clone(), Duration::from_secs(60));

        assert!(cache.lookup_slug("paused").await.unwrap().is_suspended());
        assert!(cache.lookup_slug("paused").await.unwrap().is_suspended());
        assert_eq!(inner.calls(), 1);
    }

    #[tokio::test]
    async fn test_not_found_and_errors_are_not_cached() {
        let inner = Arc::new(MockSource::new());
        let cache = cached(inner.clone(), Duration::from_secs(60));
        cache.lookup_slug("ghost").await.unwrap();
        cache.lookup_slug("ghost").await.unwrap();
        assert_eq!(inner.calls(), 2);
        assert!(cache.is_empty());

        let failing = Arc::new(MockSource::failing());
        let cache = cached(failing.clone(), Duration::from_secs(60));
        assert!(cache.lookup_slug("club").await.is_err());
        assert!(cache.lookup_slug("club").await.is_err());
        assert_eq!(failing.calls(), 2);
    }

    #[tokio::test]
    async fn test_expired_entries_are_refetched() {
        let inner = Arc::new(MockSource::new());
        inner.insert("club", TenantLookup::found(dynamic_tenant("club")));
        let cache = cached(inner.clone(), Duration::from_millis(20));

        cache.lookup_slug("club").await.unwrap();
        tokio::time::sleep(Duration::from_millis(40)).await;
        cache.lookup_slug("club").await.unwrap();

        assert_eq!(inner.calls(), 2);
    }

    #[tokio::test]
    async fn test_clear_and_name() {
        let inner = Arc::new(MockSource::new());
        inner.insert("a", TenantLookup::found(dynamic_tenant("a")));
        inner.insert("b", TenantLookup::found(dynamic_tenant("b")));
        let cache = cached(inner, Duration::from_secs(60));

        cache.lookup_slug("a").await.unwrap();
        cache.lookup_slug("b").await.unwrap();
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.name(), "mock");
    }
}
