//! Tenant resolver
//!
//! Maps an incoming request (host, path, `tenant` query parameter) to
//! exactly one tenant configuration plus its merged theme, or to a
//! suspended / not-found outcome.
//!
//! Precedence with the standard strategy list:
//! 1. A dedicated domain of a static tenant wins over anything in the path
//! 2. A slug from `?tenant=` or `/t/{slug}`, static registry before the
//!    backend
//! 3. On local development hosts, the default tenant

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

use boxclub_config_file::StaticTenantRegistry;
use boxclub_core::host::normalize_host;
use boxclub_core::theme::{apply_custom_colors, theme_vars};
use boxclub_core::{TenantConfig, TenantSource, ThemeConfig, ThemeRegistry, ThemeVars};
use boxclub_observability::Metrics;

use crate::path::derive_slug;
use crate::strategy::{
    DomainStrategy, LocalhostFallbackStrategy, ResolveStrategy, SlugStrategy, StrategyOutcome,
};

/// Request signals used for tenant resolution
#[derive(Debug, Clone, Default)]
pub struct ResolveRequest {
    /// Raw `Host` header value
    pub host: Option<String>,
    /// Request path, e.g. `/t/brewjaria/planos`
    pub path: Option<String>,
    /// Value of the `tenant` query parameter
    pub tenant_param: Option<String>,
}

impl ResolveRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_tenant_param(mut self, tenant: impl Into<String>) -> Self {
        self.tenant_param = Some(tenant.into());
        self
    }

    /// Host with port, case and trailing dot normalized
    pub fn normalized_host(&self) -> Option<String> {
        self.host.as_deref().and_then(normalize_host)
    }

    /// Slug from the query parameter or the `/t/{slug}` path prefix
    pub fn slug(&self) -> Option<String> {
        derive_slug(self.tenant_param.as_deref(), self.path.as_deref())
    }
}

/// How a tenant was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolvedBy {
    /// Dedicated domain of a static tenant
    Domain,
    /// Slug found in the static registry
    Static,
    /// Slug fetched from the backend
    Dynamic,
    /// Local development host with no other match
    Fallback,
    /// Defaulting entry point with no other match
    Default,
}

impl ResolvedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolvedBy::Domain => "domain",
            ResolvedBy::Static => "static",
            ResolvedBy::Dynamic => "dynamic",
            ResolvedBy::Fallback => "fallback",
            ResolvedBy::Default => "default",
        }
    }
}

impl fmt::Display for ResolvedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resolved tenant with its presentation theme
#[derive(Debug, Clone)]
pub struct Resolution {
    pub tenant: Arc<TenantConfig>,
    /// Theme referenced by the tenant (default theme if unknown)
    pub theme: ThemeConfig,
    /// Theme tokens with the tenant's custom colors applied
    pub theme_vars: ThemeVars,
    pub resolved_by: ResolvedBy,
    pub slug: String,
}

/// Result of a resolution attempt
#[derive(Debug, Clone)]
pub enum ResolveOutcome {
    Resolved(Box<Resolution>),
    Suspended {
        slug: String,
        message: Option<String>,
    },
    NotFound,
}

impl ResolveOutcome {
    pub fn resolution(&self) -> Option<&Resolution> {
        match self {
            ResolveOutcome::Resolved(resolution) => Some(resolution),
            _ => None,
        }
    }

    pub fn into_resolution(self) -> Option<Resolution> {
        match self {
            ResolveOutcome::Resolved(resolution) => Some(*resolution),
            _ => None,
        }
    }

    pub fn tenant(&self) -> Option<&Arc<TenantConfig>> {
        self.resolution().map(|r| &r.tenant)
    }

    pub fn resolved_by(&self) -> Option<ResolvedBy> {
        self.resolution().map(|r| r.resolved_by)
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, ResolveOutcome::Suspended { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ResolveOutcome::NotFound)
    }
}

#[derive(Debug, Error)]
pub enum ResolverError {
    #[error("default tenant '{0}' is not in the static registry")]
    MissingDefaultTenant(String),

    #[error("no default tenant configured")]
    NoDefaultTenant,
}

/// Resolves requests to tenants by walking an ordered strategy list
pub struct TenantResolver {
    strategies: Vec<Arc<dyn ResolveStrategy>>,
    default_tenant: Arc<TenantConfig>,
    themes: Arc<ThemeRegistry>,
    metrics: Option<Arc<Metrics>>,
}

impl TenantResolver {
    pub fn builder() -> TenantResolverBuilder {
        TenantResolverBuilder::default()
    }

    /// Domain, then slug (static before dynamic), then localhost fallback
    ///
    /// # Errors
    /// `ResolverError::MissingDefaultTenant` if `default_slug` is not a
    /// static tenant.
    pub fn standard(
        static_registry: Arc<StaticTenantRegistry>,
        dynamic: Option<Arc<dyn TenantSource>>,
        default_slug: &str,
    ) -> Result<Self, ResolverError> {
        let default_tenant = static_registry
            .get_by_slug(default_slug)
            .ok_or_else(|| ResolverError::MissingDefaultTenant(default_slug.to_string()))?;

        let static_source: Arc<dyn TenantSource> = static_registry;
        Self::builder()
            .strategy(DomainStrategy::new(static_source.clone()))
            .strategy(SlugStrategy::new(static_source, dynamic))
            .strategy(LocalhostFallbackStrategy::new(default_tenant.clone()))
            .default_tenant(default_tenant)
            .build()
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_themes(mut self, themes: Arc<ThemeRegistry>) -> Self {
        self.themes = themes;
        self
    }

    pub fn default_tenant(&self) -> &Arc<TenantConfig> {
        &self.default_tenant
    }

    pub fn themes(&self) -> &ThemeRegistry {
        &self.themes
    }

    /// Strategy names in evaluation order
    pub fn strategy_names(&self) -> Vec<&str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Strict resolution: no match yields `NotFound`
    pub async fn resolve(&self, request: &ResolveRequest) -> ResolveOutcome {
        let started = Instant::now();
        let outcome = self.run_strategies(request).await;
        self.record(&outcome, started);
        outcome
    }

    /// Like [`resolve`](Self::resolve), but `NotFound` becomes the default
    /// tenant with `ResolvedBy::Default`. Suspension is preserved.
    pub async fn resolve_or_default(&self, request: &ResolveRequest) -> ResolveOutcome {
        let started = Instant::now();
        let outcome = match self.run_strategies(request).await {
            ResolveOutcome::NotFound => {
                debug!(
                    "No tenant for host {:?}, using default '{}'",
                    request.host, self.default_tenant.slug
                );
                self.resolution(self.default_tenant.clone(), ResolvedBy::Default)
            }
            other => other,
        };
        self.record(&outcome, started);
        outcome
    }

    /// Build the resolution for a known tenant, merging its theme
    pub fn resolution(&self, tenant: Arc<TenantConfig>, resolved_by: ResolvedBy) -> ResolveOutcome {
        let theme = self.themes.get_theme(&tenant.theme_slug).clone();
        let vars = apply_custom_colors(theme_vars(&theme), tenant.custom_colors.as_ref());
        ResolveOutcome::Resolved(Box::new(Resolution {
            slug: tenant.slug.clone(),
            tenant,
            theme,
            theme_vars: vars,
            resolved_by,
        }))
    }

    async fn run_strategies(&self, request: &ResolveRequest) -> ResolveOutcome {
        for strategy in &self.strategies {
            match strategy.try_resolve(request).await {
                Ok(StrategyOutcome::Matched {
                    tenant,
                    resolved_by,
                }) => {
                    debug!(
                        "Resolved tenant '{}' by {} (strategy '{}')",
                        tenant.slug,
                        resolved_by,
                        strategy.name()
                    );
                    return self.resolution(tenant, resolved_by);
                }
                Ok(StrategyOutcome::Suspended { slug, message }) => {
                    return ResolveOutcome::Suspended { slug, message };
                }
                Ok(StrategyOutcome::Pass) => {}
                Err(failure) => {
                    // Visitors see the same outcome as an unknown tenant
                    warn!(
                        "Tenant lookup failed (strategy '{}', slug {:?}): {}",
                        strategy.name(),
                        failure.slug,
                        failure
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.record_upstream_failure(&failure.source_name);
                    }
                }
            }
        }

        ResolveOutcome::NotFound
    }

    fn record(&self, outcome: &ResolveOutcome, started: Instant) {
        let Some(metrics) = &self.metrics else {
            return;
        };
        let elapsed = started.elapsed().as_secs_f64();
        match outcome {
            ResolveOutcome::Resolved(resolution) => {
                metrics.record_resolution(resolution.resolved_by.as_str(), elapsed)
            }
            ResolveOutcome::Suspended { .. } => metrics.record_suspended(elapsed),
            ResolveOutcome::NotFound => metrics.record_not_found(elapsed),
        }
    }
}

/// Builder for a custom strategy list
#[derive(Default)]
pub struct TenantResolverBuilder {
    strategies: Vec<Arc<dyn ResolveStrategy>>,
    default_tenant: Option<Arc<TenantConfig>>,
    themes: Option<Arc<ThemeRegistry>>,
    metrics: Option<Arc<Metrics>>,
}

impl TenantResolverBuilder {
    /// Append a strategy; strategies run in insertion order
    pub fn strategy(mut self, strategy: impl ResolveStrategy + 'static) -> Self {
        self.strategies.push(Arc::new(strategy));
        self
    }

    pub fn shared_strategy(mut self, strategy: Arc<dyn ResolveStrategy>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn default_tenant(mut self, tenant: Arc<TenantConfig>) -> Self {
        self.default_tenant = Some(tenant);
        self
    }

    pub fn themes(mut self, themes: Arc<ThemeRegistry>) -> Self {
        self.themes = Some(themes);
        self
    }

    pub fn metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn build(self) -> Result<TenantResolver, ResolverError> {
        let default_tenant = self.default_tenant.ok_or(ResolverError::NoDefaultTenant)?;
        Ok(TenantResolver {
            strategies: self.strategies,
            default_tenant,
            themes: self
                .themes
                .unwrap_or_else(|| Arc::new(ThemeRegistry::builtin())),
            metrics: self.metrics,
        })
    }
}
