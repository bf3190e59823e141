//! Static tenant registry
//!
//! An in-memory table of tenant configurations built once at startup from
//! the built-in definitions and/or a directory of definition files. The
//! registry is never mutated after construction, so it can be shared behind
//! an `Arc` by any number of concurrent requests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use boxclub_core::{
    Error, Result, TenantConfig, TenantLookup, TenantSource,
    host::{is_domain_candidate, normalize_host},
};

use crate::definitions::{DefinitionFormat, builtin_definitions, expand_tilde, read_definition_file};

#[derive(Debug, Default)]
pub struct StaticTenantRegistry {
    by_slug: HashMap<String, Arc<TenantConfig>>,
    by_domain: HashMap<String, Arc<TenantConfig>>,
    /// Slugs in load order
    order: Vec<String>,
}

impl StaticTenantRegistry {
    /// Build a registry from already-parsed definitions
    ///
    /// # Errors
    /// - `Error::DuplicateSlug` if two definitions share a slug
    /// - `Error::InvalidTenant` / `Error::ConfigValidation` if a definition
    ///   breaks a per-tenant invariant or lists a malformed domain
    pub fn from_tenants(tenants: Vec<TenantConfig>) -> Result<Self> {
        let mut registry = Self::default();

        for tenant in tenants {
            registry.insert(tenant)?;
        }

        info!(
            "Static tenant registry loaded: {} tenants, {} domains",
            registry.by_slug.len(),
            registry.by_domain.len()
        );

        Ok(registry)
    }

    /// Registry with only the definitions compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_tenants(builtin_definitions()?)
    }

    /// Load every definition file in a directory on top of `base`
    ///
    /// Files are read in name order. Files with an unknown extension are skipped.
    ///
    /// # Errors
    /// - `Error::Io` if the directory or a file can't be read
    /// - any error from [`parse_definition`](crate::definitions::parse_definition)
    ///   or [`from_tenants`](Self::from_tenants)
    pub fn load_dir(directory: impl Into<PathBuf>, base: Vec<TenantConfig>) -> Result<Self> {
        let directory = expand_tilde(directory)?;
        info!("Loading tenant definitions from {:?}", directory);

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&directory)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        let mut tenants = base;
        for path in paths {
            if DefinitionFormat::from_path(&path).is_none() {
                debug!("Skipping non-definition file {:?}", path);
                continue;
            }
            tenants.push(read_definition_file(&path)?);
        }

        Self::from_tenants(tenants)
    }

    fn insert(&mut self, tenant: TenantConfig) -> Result<()> {
        tenant.validate()?;

        if self.by_slug.contains_key(&tenant.slug) {
            return Err(Error::DuplicateSlug(tenant.slug));
        }

        if !tenant.has_checkout() {
            warn!(
                "Tenant '{}' has no plans; checkout is disabled for it",
                tenant.slug
            );
        }

        let tenant = Arc::new(tenant);

        for raw in &tenant.domains {
            let domain = normalize_host(raw)
                .filter(|d| is_domain_candidate(d))
                .ok_or_else(|| {
                    Error::ConfigValidation(format!(
                        "tenant '{}' lists invalid domain '{}'",
                        tenant.slug, raw
                    ))
                })?;

            match self.by_domain.get(&domain) {
                Some(owner) if owner.slug != tenant.slug => {
                    warn!(
                        "Domain '{}' claimed by both '{}' and '{}'; keeping '{}'",
                        domain, owner.slug, tenant.slug, owner.slug
                    );
                }
                Some(_) => {}
                None => {
                    self.by_domain.insert(domain, tenant.clone());
                }
            }
        }

        debug!("Registered static tenant '{}'", tenant.slug);
        self.order.push(tenant.slug.clone());
        self.by_slug.insert(tenant.slug.clone(), tenant);
        Ok(())
    }

    pub fn get_by_slug(&self, slug: &str) -> Option<Arc<TenantConfig>> {
        self.by_slug.get(slug).cloned()
    }

    /// Look up a tenant by a raw or normalized hostname
    ///
    /// Malformed hosts never match.
    pub fn get_by_domain(&self, host: &str) -> Option<Arc<TenantConfig>> {
        let host = normalize_host(host)?;
        self.by_domain.get(&host).cloned()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// Slugs in load order
    pub fn slugs(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.by_slug.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_slug.is_empty()
    }
}

#[async_trait]
impl TenantSource for StaticTenantRegistry {
    fn name(&self) -> &str {
        "static"
    }

    async fn lookup_slug(&self, slug: &str) -> Result<TenantLookup> {
        Ok(self
            .get_by_slug(slug)
            .map(TenantLookup::Found)
            .unwrap_or(TenantLookup::NotFound))
    }

    async fn lookup_domain(&self, host: &str) -> Result<TenantLookup> {
        Ok(self
            .get_by_domain(host)
            .map(TenantLookup::Found)
            .unwrap_or(TenantLookup::NotFound))
    }
}
