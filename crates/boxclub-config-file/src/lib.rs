//! File-based static tenant registry for BoxClub
//!
//! This crate builds the read-only table of tenants known at startup:
//! definitions compiled into the binary plus an optional directory of
//! per-tenant YAML/TOML files.
//!
//! # Example
//! ```no_run
//! # use boxclub_config_file::{StaticTenantRegistry, builtin_definitions};
//! # fn example() -> boxclub_core::Result<()> {
//! let registry = StaticTenantRegistry::load_dir("~/.boxclub/tenants", builtin_definitions()?)?;
//! let tenant = registry.get_by_domain("brewjaria.com.br");
//! # Ok(())
//! # }
//! ```

mod definitions;
mod registry;

pub use definitions::{
    DefinitionFormat, builtin_definitions, expand_tilde, parse_definition, read_definition_file,
};
pub use registry::StaticTenantRegistry;
