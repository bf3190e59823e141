//! BoxClub Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout BoxClub:
//! - Hostname normalization
//! - Tenant configuration model (branding, content, plans, checkout)
//! - Theme registry and design-token merging
//! - The `TenantSource` abstraction shared by static and dynamic lookups
//! - Core error types

pub mod error;
pub mod host;
pub mod tenant;
pub mod tenant_source;
pub mod theme;

pub use error::{Error, Result};
pub use tenant::{PlanConfig, TenantConfig, is_valid_slug};
pub use tenant_source::{TenantLookup, TenantSource};
pub use theme::{CustomColors, ThemeConfig, ThemeMode, ThemeRegistry, ThemeVars};
