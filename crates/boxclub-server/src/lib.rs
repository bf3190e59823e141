//! BoxClub storefront server
//!
//! Resolves the tenant for every request (domain, slug, local fallback),
//! installs a rendering context and serves tenant data, theme tokens and a
//! tenant-scoped backend proxy.

pub mod admin;
pub mod app;
pub mod config;
pub mod context;
pub mod handlers;

pub use app::{AppState, BootstrapError, build_state, load_registry, router};
pub use config::{ConfigError, ServerConfig};
pub use context::RenderingContext;
