//! BoxClub Tenant Routing
//!
//! This crate decides which tenant serves a request:
//! - Slug extraction from `?tenant=` and `/t/{slug}`
//! - Ordered resolution strategies (domain, slug, localhost fallback)
//! - `TenantResolver` with strict and defaulting entry points
//! - Optional TTL cache for the dynamic tenant source

pub mod cache;
pub mod path;
pub mod resolver;
pub mod strategy;

pub use cache::CachedTenantSource;
pub use path::{derive_slug, slug_from_path};
pub use resolver::{
    Resolution, ResolveOutcome, ResolveRequest, ResolvedBy, ResolverError, TenantResolver,
    TenantResolverBuilder,
};
pub use strategy::{
    DomainStrategy, LocalhostFallbackStrategy, ResolveStrategy, SlugStrategy, SourceFailure,
    StrategyOutcome,
};
