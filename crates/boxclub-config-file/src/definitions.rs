//! Tenant definition files
//!
//! One file holds one `TenantConfig`. The format is picked from the file
//! extension: `.toml` is TOML, `.yaml`/`.yml` is YAML.

use std::path::{Path, PathBuf};
use tracing::{debug, error};

use boxclub_core::{Error, Result, TenantConfig};

/// Definitions compiled into the binary
const BUILTIN_DEFINITIONS: &[(&str, &str)] = &[
    ("brewjaria.yaml", include_str!("../tenants/brewjaria.yaml")),
    ("grao-mestre.yaml", include_str!("../tenants/grao-mestre.yaml")),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionFormat {
    Yaml,
    Toml,
}

impl DefinitionFormat {
    /// Detect the format from a file extension; `None` for anything else
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Some(DefinitionFormat::Yaml),
            Some("toml") => Some(DefinitionFormat::Toml),
            _ => None,
        }
    }
}

/// Parse one definition
///
/// `origin` names the file in error messages.
pub fn parse_definition(
    contents: &str,
    format: DefinitionFormat,
    origin: &str,
) -> Result<TenantConfig> {
    let tenant: TenantConfig = match format {
        DefinitionFormat::Toml => toml::from_str(contents).map_err(|e| {
            error!("Failed to parse TOML tenant definition {}: {}", origin, e);
            Error::Config(format!("Invalid TOML in {}: {}", origin, e))
        })?,
        DefinitionFormat::Yaml => serde_yaml::from_str(contents).map_err(|e| {
            error!("Failed to parse YAML tenant definition {}: {}", origin, e);
            Error::Config(format!("Invalid YAML in {}: {}", origin, e))
        })?,
    };

    debug!("Parsed tenant definition '{}' from {}", tenant.slug, origin);
    Ok(tenant)
}

/// Read and parse a definition file
///
/// # Errors
/// - `Error::Config` if the extension is not a known format or parsing fails
/// - `Error::Io` if the file can't be read
pub fn read_definition_file(path: &Path) -> Result<TenantConfig> {
    let format = DefinitionFormat::from_path(path).ok_or_else(|| {
        Error::Config(format!("Unsupported tenant definition file: {:?}", path))
    })?;

    let contents = std::fs::read_to_string(path).map_err(|e| {
        error!("Failed to read tenant definition {:?}: {}", path, e);
        Error::Io(e)
    })?;

    parse_definition(&contents, format, &path.display().to_string())
}

/// Parse the definitions compiled into the binary
pub fn builtin_definitions() -> Result<Vec<TenantConfig>> {
    BUILTIN_DEFINITIONS
        .iter()
        .map(|(name, contents)| parse_definition(contents, DefinitionFormat::Yaml, name))
        .collect()
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: impl Into<PathBuf>) -> Result<PathBuf> {
    let path = path.into();
    match path.strip_prefix("~") {
        Ok(rest) => Ok(dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?
            .join(rest)),
        Err(_) => Ok(path),
    }
}
