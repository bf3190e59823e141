//! Tenant source trait
//!
//! The `TenantSource` trait abstracts where tenant configurations come from,
//! allowing the resolver to treat the static registry (definition files) and
//! the backend API the same way.

use async_trait::async_trait;
use std::sync::Arc;

use crate::{Result, tenant::TenantConfig};

/// Outcome of looking up one tenant in a source
#[derive(Debug, Clone)]
pub enum TenantLookup {
    /// The tenant exists and is active
    Found(Arc<TenantConfig>),

    /// The tenant exists but its storefront is administratively disabled
    Suspended {
        /// Operator-supplied notice, if any
        message: Option<String>,
    },

    /// No such tenant in this source
    NotFound,
}

impl TenantLookup {
    pub fn found(tenant: TenantConfig) -> Self {
        TenantLookup::Found(Arc::new(tenant))
    }

    pub fn is_found(&self) -> bool {
        matches!(self, TenantLookup::Found(_))
    }

    pub fn is_suspended(&self) -> bool {
        matches!(self, TenantLookup::Suspended { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TenantLookup::NotFound)
    }

    /// The tenant, if found
    pub fn tenant(&self) -> Option<&Arc<TenantConfig>> {
        match self {
            TenantLookup::Found(tenant) => Some(tenant),
            _ => None,
        }
    }
}

/// A place tenant configurations can be looked up
///
/// Implementations:
/// - `StaticTenantRegistry`: in-memory table built at startup
/// - `ApiTenantFetcher`: backend tenant-lookup endpoint
/// - `CachedTenantSource`: TTL cache around another source
///
/// # Errors
///
/// `Ok(TenantLookup::NotFound)` is a normal answer. `Err` means the source
/// could not answer at all (e.g. `Error::Upstream` when the backend is down).
#[async_trait]
pub trait TenantSource: Send + Sync {
    /// Short name for logs and metrics
    fn name(&self) -> &str;

    /// Look up a tenant by slug
    async fn lookup_slug(&self, slug: &str) -> Result<TenantLookup>;

    /// Look up a tenant by normalized hostname
    ///
    /// Sources without a domain index answer `NotFound`.
    async fn lookup_domain(&self, _host: &str) -> Result<TenantLookup> {
        Ok(TenantLookup::NotFound)
    }
}
