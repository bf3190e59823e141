//! Tenant resolution strategies
//!
//! The resolver walks an ordered list of strategies and stops at the first
//! one that produces a decision. The standard order is:
//!
//! 1. [`DomainStrategy`]: dedicated domain of a static tenant
//! 2. [`SlugStrategy`]: slug from `?tenant=` or `/t/{slug}`, static first,
//!    then the dynamic source
//! 3. [`LocalhostFallbackStrategy`]: default tenant on local-dev hosts
//!
//! Each strategy can be tested alone and the list can be reordered or
//! extended without touching the resolver.

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use boxclub_core::host::{is_domain_candidate, is_local_host};
use boxclub_core::{TenantConfig, TenantLookup, TenantSource};

use crate::resolver::{ResolveRequest, ResolvedBy};

/// Decision produced by one strategy
#[derive(Debug, Clone)]
pub enum StrategyOutcome {
    /// A tenant was found; stop here
    Matched {
        tenant: Arc<TenantConfig>,
        resolved_by: ResolvedBy,
    },

    /// The tenant exists but is suspended; stop here
    Suspended {
        slug: String,
        message: Option<String>,
    },

    /// No decision; try the next strategy
    Pass,
}

/// A tenant source could not answer
#[derive(Debug, Error)]
#[error("tenant source '{source_name}' failed: {error}")]
pub struct SourceFailure {
    pub source_name: String,
    pub slug: Option<String>,
    #[source]
    pub error: boxclub_core::Error,
}

/// One step of the resolution chain
#[async_trait]
pub trait ResolveStrategy: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Try to resolve the request
    ///
    /// # Errors
    /// `SourceFailure` when a backing source is unreachable. The resolver
    /// treats it like `Pass` after recording it.
    async fn try_resolve(
        &self,
        request: &ResolveRequest,
    ) -> Result<StrategyOutcome, SourceFailure>;
}

fn failure<'a>(
    source: &'a dyn TenantSource,
    slug: Option<&'a str>,
) -> impl FnOnce(boxclub_core::Error) -> SourceFailure + 'a {
    move |error| SourceFailure {
        source_name: source.name().to_string(),
        slug: slug.map(str::to_string),
        error,
    }
}

/// Resolve by the request's hostname against tenants' dedicated domains
pub struct DomainStrategy {
    source: Arc<dyn TenantSource>,
}

impl DomainStrategy {
    pub fn new(source: Arc<dyn TenantSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ResolveStrategy for DomainStrategy {
    fn name(&self) -> &str {
        "domain"
    }

    async fn try_resolve(
        &self,
        request: &ResolveRequest,
    ) -> Result<StrategyOutcome, SourceFailure> {
        let Some(host) = request.normalized_host() else {
            return Ok(StrategyOutcome::Pass);
        };
        if !is_domain_candidate(&host) {
            return Ok(StrategyOutcome::Pass);
        }

        let source = self.source.as_ref();
        let lookup = source
            .lookup_domain(&host)
            .await
            .map_err(failure(source, None))?;
        match lookup {
            TenantLookup::Found(tenant) => {
                debug!("Host '{}' is a domain of tenant '{}'", host, tenant.slug);
                Ok(StrategyOutcome::Matched {
                    tenant,
                    resolved_by: ResolvedBy::Domain,
                })
            }
            TenantLookup::Suspended { message } => Ok(StrategyOutcome::Suspended {
                slug: host,
                message,
            }),
            TenantLookup::NotFound => Ok(StrategyOutcome::Pass),
        }
    }
}

/// Resolve by the slug carried in the query or path
///
/// The static source is always asked first; the dynamic source is only
/// called on a static miss.
pub struct SlugStrategy {
    static_source: Arc<dyn TenantSource>,
    dynamic_source: Option<Arc<dyn TenantSource>>,
}

impl SlugStrategy {
    pub fn new(
        static_source: Arc<dyn TenantSource>,
        dynamic_source: Option<Arc<dyn TenantSource>>,
    ) -> Self {
        Self {
            static_source,
            dynamic_source,
        }
    }
}

#[async_trait]
impl ResolveStrategy for SlugStrategy {
    fn name(&self) -> &str {
        "slug"
    }

    async fn try_resolve(
        &self,
        request: &ResolveRequest,
    ) -> Result<StrategyOutcome, SourceFailure> {
        let Some(slug) = request.slug() else {
            return Ok(StrategyOutcome::Pass);
        };

        let static_source = self.static_source.as_ref();
        let lookup = static_source
            .lookup_slug(&slug)
            .await
            .map_err(failure(static_source, Some(&slug)))?;
        if let TenantLookup::Found(tenant) = lookup {
            debug!("Slug '{}' resolved from static registry", slug);
            return Ok(StrategyOutcome::Matched {
                tenant,
                resolved_by: ResolvedBy::Static,
            });
        }

        let Some(dynamic) = &self.dynamic_source else {
            return Ok(StrategyOutcome::Pass);
        };

        let dynamic = dynamic.as_ref();
        let lookup = dynamic
            .lookup_slug(&slug)
            .await
            .map_err(failure(dynamic, Some(&slug)))?;
        match lookup {
            TenantLookup::Found(tenant) => {
                debug!("Slug '{}' resolved from '{}'", slug, dynamic.name());
                Ok(StrategyOutcome::Matched {
                    tenant,
                    resolved_by: ResolvedBy::Dynamic,
                })
            }
            TenantLookup::Suspended { message } => {
                debug!("Slug '{}' belongs to a suspended tenant", slug);
                Ok(StrategyOutcome::Suspended { slug, message })
            }
            TenantLookup::NotFound => Ok(StrategyOutcome::Pass),
        }
    }
}

/// Serve the default tenant to local development hosts
pub struct LocalhostFallbackStrategy {
    default_tenant: Arc<TenantConfig>,
}

impl LocalhostFallbackStrategy {
    pub fn new(default_tenant: Arc<TenantConfig>) -> Self {
        Self { default_tenant }
    }
}

#[async_trait]
impl ResolveStrategy for LocalhostFallbackStrategy {
    fn name(&self) -> &str {
        "localhost-fallback"
    }

    async fn try_resolve(
        &self,
        request: &ResolveRequest,
    ) -> Result<StrategyOutcome, SourceFailure> {
        let is_local = request
            .normalized_host()
            .is_some_and(|host| is_local_host(&host));

        if is_local {
            Ok(StrategyOutcome::Matched {
                tenant: self.default_tenant.clone(),
                resolved_by: ResolvedBy::Fallback,
            })
        } else {
            Ok(StrategyOutcome::Pass)
        }
    }
}
