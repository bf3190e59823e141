//! Metrics collection with Prometheus
//!
//! This module provides Prometheus metrics for tenant resolution:
//! - Resolutions by strategy (`domain`, `static`, `dynamic`, `fallback`, `default`)
//! - Not-found and suspended outcomes
//! - Upstream failures of the dynamic tenant source, and when the last one happened
//! - Dynamic cache hits and misses
//! - Resolution latency

use prometheus::{Counter, CounterVec, GaugeVec, Histogram, HistogramOpts, Opts, Registry};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Metrics collector for BoxClub
#[derive(Clone)]
pub struct Metrics {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Successful resolutions, labelled by how the tenant was found
    pub resolutions_total: CounterVec,
    /// Requests for which no tenant could be resolved
    pub not_found_total: Counter,
    /// Requests that resolved to a suspended tenant
    pub suspended_total: Counter,
    /// Dynamic lookups that failed (transport, timeout, bad status, bad body)
    pub upstream_failures_total: CounterVec,
    /// Unix time of the latest upstream failure per source, 0 if none yet
    pub upstream_last_failure_timestamp_seconds: GaugeVec,
    /// Dynamic cache lookups by result (`hit` / `miss`)
    pub cache_lookups_total: CounterVec,
    /// Time spent resolving a tenant, including any backend call
    pub resolution_duration_seconds: Histogram,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let resolutions_total = CounterVec::new(
            Opts::new(
                "boxclub_tenant_resolutions_total",
                "Total number of resolved tenant requests",
            ),
            &["resolved_by"],
        )?;

        let not_found_total = Counter::with_opts(Opts::new(
            "boxclub_tenant_not_found_total",
            "Total number of requests with no resolvable tenant",
        ))?;

        let suspended_total = Counter::with_opts(Opts::new(
            "boxclub_tenant_suspended_total",
            "Total number of requests for suspended tenants",
        ))?;

        let upstream_failures_total = CounterVec::new(
            Opts::new(
                "boxclub_tenant_upstream_failures_total",
                "Total number of failed dynamic tenant lookups",
            ),
            &["source"],
        )?;

        let upstream_last_failure_timestamp_seconds = GaugeVec::new(
            Opts::new(
                "boxclub_tenant_upstream_last_failure_timestamp_seconds",
                "Unix time of the most recent failed dynamic tenant lookup",
            ),
            &["source"],
        )?;

        let cache_lookups_total = CounterVec::new(
            Opts::new(
                "boxclub_tenant_cache_lookups_total",
                "Total number of dynamic tenant cache lookups",
            ),
            &["result"],
        )?;

        let resolution_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "boxclub_tenant_resolution_duration_seconds",
                "Tenant resolution duration in seconds",
            )
            .buckets(vec![
                0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0,
            ]),
        )?;

        registry.register(Box::new(resolutions_total.clone()))?;
        registry.register(Box::new(not_found_total.clone()))?;
        registry.register(Box::new(suspended_total.clone()))?;
        registry.register(Box::new(upstream_failures_total.clone()))?;
        registry.register(Box::new(upstream_last_failure_timestamp_seconds.clone()))?;
        registry.register(Box::new(cache_lookups_total.clone()))?;
        registry.register(Box::new(resolution_duration_seconds.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            resolutions_total,
            not_found_total,
            suspended_total,
            upstream_failures_total,
            upstream_last_failure_timestamp_seconds,
            cache_lookups_total,
            resolution_duration_seconds,
        })
    }

    /// Get the Prometheus registry for exporting metrics
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record a successful resolution
    pub fn record_resolution(&self, resolved_by: &str, duration_secs: f64) {
        self.resolutions_total
            .with_label_values(&[resolved_by])
            .inc();
        self.resolution_duration_seconds.observe(duration_secs);
    }

    pub fn record_not_found(&self, duration_secs: f64) {
        self.not_found_total.inc();
        self.resolution_duration_seconds.observe(duration_secs);
    }

    pub fn record_suspended(&self, duration_secs: f64) {
        self.suspended_total.inc();
        self.resolution_duration_seconds.observe(duration_secs);
    }

    /// Record a failed lookup against a tenant source
    pub fn record_upstream_failure(&self, source: &str) {
        self.upstream_failures_total
            .with_label_values(&[source])
            .inc();
        self.upstream_last_failure_timestamp_seconds
            .with_label_values(&[source])
            .set(unix_now());
    }

    pub fn record_cache_hit(&self) {
        self.cache_lookups_total.with_label_values(&["hit"]).inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_lookups_total.with_label_values(&["miss"]).inc();
    }

    /// Current value of the upstream-failure counter for a source
    pub fn upstream_failures(&self, source: &str) -> f64 {
        self.upstream_failures_total
            .with_label_values(&[source])
            .get()
    }

    /// Seconds since the last upstream failure of a source, `None` if it never failed
    pub fn seconds_since_upstream_failure(&self, source: &str) -> Option<f64> {
        let last = self
            .upstream_last_failure_timestamp_seconds
            .with_label_values(&[source])
            .get();
        (last > 0.0).then(|| (unix_now() - last).max(0.0))
    }

    /// Current value of the resolution counter for a strategy label
    pub fn resolutions(&self, resolved_by: &str) -> f64 {
        self.resolutions_total
            .with_label_values(&[resolved_by])
            .get()
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        // Plain counters and histograms are exported before first use
        assert!(!metrics.registry().gather().is_empty());
    }

    #[test]
    fn test_record_resolution() {
        let metrics = Metrics::new().unwrap();
        metrics.record_resolution("domain", 0.002);
        metrics.record_resolution("domain", 0.001);
        metrics.record_resolution("dynamic", 0.2);

        assert_eq!(metrics.resolutions("domain"), 2.0);
        assert_eq!(metrics.resolutions("dynamic"), 1.0);
        assert_eq!(metrics.resolution_duration_seconds.get_sample_count(), 3);
    }

    #[test]
    fn test_record_outcomes() {
        let metrics = Metrics::new().unwrap();
        metrics.record_not_found(0.01);
        metrics.record_suspended(0.01);
        metrics.record_upstream_failure("api");

        assert_eq!(metrics.not_found_total.get(), 1.0);
        assert_eq!(metrics.suspended_total.get(), 1.0);
        assert_eq!(metrics.upstream_failures("api"), 1.0);
    }

    #[test]
    fn test_last_upstream_failure() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.seconds_since_upstream_failure("api"), None);

        metrics.record_upstream_failure("api");
        let ago = metrics.seconds_since_upstream_failure("api").unwrap();
        assert!((0.0..5.0).contains(&ago));
        assert_eq!(metrics.seconds_since_upstream_failure("other"), None);
    }

    #[test]
    fn test_cache_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.record_cache_hit();
        metrics.record_cache_miss();
        metrics.record_cache_miss();

        let gathered = metrics.registry().gather();
        let cache = gathered
            .iter()
            .find(|m| m.name() == "boxclub_tenant_cache_lookups_total")
            .unwrap();
        assert_eq!(cache.metric.len(), 2);
    }
}
