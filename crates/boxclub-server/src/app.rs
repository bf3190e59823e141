//! Application state and router
//!
//! `AppState` holds the shared, read-only pieces every request needs: the
//! resolver, the static registry, the theme registry and the optional
//! dynamic-tenant cache. `build_state` wires them from a `ServerConfig`.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tower_http::trace::TraceLayer;
use tracing::info;

use boxclub_config_file::{StaticTenantRegistry, builtin_definitions};
use boxclub_core::{TenantSource, ThemeRegistry};
use boxclub_egress::{
    ApiConfig, ApiTenantFetcher, BackendClient, EgressError, HttpClientConfig,
};
use boxclub_observability::{
    HealthState, Metrics, ReadinessChecker, SourceState, SourceStatus, health_router,
};
use boxclub_routing::{CachedTenantSource, ResolverError, TenantResolver};

use crate::admin::require_admin_token;
use crate::config::ServerConfig;
use crate::context::{resolve_tenant, resolve_tenant_or_default};
use crate::handlers;

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("failed to load tenant definitions: {0}")]
    Registry(#[from] boxclub_core::Error),

    #[error("failed to set up backend client: {0}")]
    Egress(#[from] EgressError),

    #[error(transparent)]
    Resolver(#[from] ResolverError),
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<TenantResolver>,
    pub registry: Arc<StaticTenantRegistry>,
    pub themes: Arc<ThemeRegistry>,
    /// Dynamic tenant cache, absent when the backend is disabled
    pub cache: Option<Arc<CachedTenantSource>>,
    /// Tenant-scoped backend client, absent when the backend is disabled
    pub backend: Option<BackendClient>,
    /// Bearer token for `/internal/...`; internal routes are refused without one
    pub admin_token: Option<Arc<str>>,
    pub metrics: Arc<Metrics>,
}

/// Load the static registry described by the tenant settings
pub fn load_registry(config: &ServerConfig) -> Result<StaticTenantRegistry, BootstrapError> {
    let base = if config.tenants.include_builtin {
        builtin_definitions()?
    } else {
        Vec::new()
    };

    let registry = match &config.tenants.directory {
        Some(directory) => StaticTenantRegistry::load_dir(directory, base)?,
        None => StaticTenantRegistry::from_tenants(base)?,
    };
    Ok(registry)
}

/// Wire registry, backend source, cache and resolver from configuration
pub fn build_state(config: &ServerConfig, metrics: Arc<Metrics>) -> Result<AppState, BootstrapError> {
    let registry = Arc::new(load_registry(config)?);
    info!(
        "Loaded {} static tenants: {}",
        registry.len(),
        registry.slugs().join(", ")
    );

    let themes = Arc::new(ThemeRegistry::builtin());

    let (cache, backend) = if config.api.enabled {
        let api_config = ApiConfig {
            base_url: config.api.url.clone(),
            client_config: HttpClientConfig {
                timeout_secs: config.api.timeout_secs,
                connect_timeout_secs: config.api.connect_timeout_secs,
                ..Default::default()
            },
        };

        let fetcher: Arc<dyn TenantSource> = Arc::new(ApiTenantFetcher::new(api_config.clone())?);
        let cache = CachedTenantSource::new(
            fetcher,
            Duration::from_secs(config.tenants.cache_ttl_secs),
        )
        .with_metrics(metrics.clone());

        if cache.is_enabled() {
            info!(
                "Dynamic tenants from {} (cached for {}s)",
                config.api.url, config.tenants.cache_ttl_secs
            );
        } else {
            info!("Dynamic tenants from {} (uncached)", config.api.url);
        }

        (Some(Arc::new(cache)), Some(BackendClient::new(api_config)?))
    } else {
        info!("Backend disabled, serving static tenants only");
        (None, None)
    };

    let dynamic = cache
        .clone()
        .map(|cache| cache as Arc<dyn TenantSource>);
    let resolver = TenantResolver::standard(registry.clone(), dynamic, &config.tenants.default_slug)?
        .with_themes(themes.clone())
        .with_metrics(metrics.clone());

    info!(
        "Default tenant '{}', strategies: {}",
        resolver.default_tenant().slug,
        resolver.strategy_names().join(" -> ")
    );

    Ok(AppState {
        resolver: Arc::new(resolver),
        registry,
        themes,
        cache,
        backend,
        admin_token: config.admin.token.as_deref().map(Arc::from),
        metrics,
    })
}

/// Upstream failures within this window mark the api source degraded
const API_DEGRADED_WINDOW: Duration = Duration::from_secs(60);

/// Static tenants are required; the backend is optional and degrades after
/// recent lookup failures
struct TenantSourceReadiness {
    registry: Arc<StaticTenantRegistry>,
    backend_enabled: bool,
    metrics: Arc<Metrics>,
}

impl ReadinessChecker for TenantSourceReadiness {
    fn sources(&self) -> Vec<SourceStatus> {
        let static_state = if self.registry.is_empty() {
            SourceState::Unavailable
        } else {
            SourceState::Ready
        };
        let static_source =
            SourceStatus::new("static", static_state, true).with_tenants(self.registry.len());

        let api_source = if self.backend_enabled {
            let since_failure = self.metrics.seconds_since_upstream_failure("api");
            let state = match since_failure {
                Some(secs) if secs < API_DEGRADED_WINDOW.as_secs_f64() => SourceState::Degraded,
                _ => SourceState::Ready,
            };
            SourceStatus::new("api", state, false)
                .with_last_failure(since_failure.map(|secs| secs as u64))
        } else {
            SourceStatus::new("api", SourceState::Disabled, false)
        };

        vec![static_source, api_source]
    }
}

/// Build the HTTP router
pub fn router(state: AppState) -> Router {
    let strict = Router::new()
        .route("/api/tenant", get(handlers::tenant_info))
        .route("/api/tenant/theme.css", get(handlers::theme_css))
        .route("/api/backend/{*path}", get(handlers::backend_proxy))
        .route("/t/{slug}", get(handlers::storefront))
        .route("/t/{slug}/{*rest}", get(handlers::storefront))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_tenant,
        ));

    let defaulting = Router::new()
        .route("/api/metadata", get(handlers::metadata))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            resolve_tenant_or_default,
        ));

    let unscoped = Router::new().route("/api/themes/{slug}", get(handlers::theme_tokens));

    let internal = Router::new()
        .route(
            "/internal/tenants/{slug}/invalidate",
            post(handlers::invalidate_tenant),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_admin_token,
        ));

    let readiness = Arc::new(TenantSourceReadiness {
        registry: state.registry.clone(),
        backend_enabled: state.cache.is_some(),
        metrics: state.metrics.clone(),
    });
    let health = health_router(HealthState::with_readiness_checker(
        state.metrics.clone(),
        readiness,
    ));

    strict
        .merge(defaulting)
        .merge(unscoped)
        .merge(internal)
        .with_state(state)
        .merge(health)
        .layer(TraceLayer::new_for_http())
}
