use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use boxclub_core::is_valid_slug;

/// Backend URL used when neither the config file nor the environment sets one
pub const DEFAULT_API_URL: &str = "http://localhost:3001/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub tenants: TenantSettings,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub admin: AdminSettings,
}

/// Backend tenant API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Dynamic tenants are only looked up when enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_api_url")]
    pub url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantSettings {
    /// Extra tenant definition files (`*.yaml`, `*.yml`, `*.toml`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,

    /// Tenant served to local-dev hosts and by the defaulting entry point
    #[serde(default = "default_tenant_slug")]
    pub default_slug: String,

    /// Load the definitions compiled into the binary
    #[serde(default = "default_true")]
    pub include_builtin: bool,

    /// Dynamic tenant cache TTL; 0 fetches on every request
    #[serde(default)]
    pub cache_ttl_secs: u64,
}

/// Internal endpoints (`/internal/...`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Bearer token required by internal endpoints; unset disables them
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable text
    #[serde(default = "default_false")]
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            api: ApiSettings::default(),
            tenants: TenantSettings::default(),
            logging: LoggingConfig::default(),
            admin: AdminSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

impl Default for TenantSettings {
    fn default() -> Self {
        Self {
            directory: None,
            default_slug: default_tenant_slug(),
            include_builtin: true,
            cache_ttl_secs: 0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

impl ServerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        // Backend URL: BOXCLUB_API_URL, then the storefront's public URL
        if let Some(url) =
            env_non_empty("BOXCLUB_API_URL").or_else(|| env_non_empty("NEXT_PUBLIC_API_URL"))
        {
            self.api.url = url;
        }

        if let Some(val) = env_non_empty("BOXCLUB_API_ENABLED") {
            match val.parse::<bool>() {
                Ok(enabled) => self.api.enabled = enabled,
                Err(_) => eprintln!("Warning: Invalid BOXCLUB_API_ENABLED '{}', ignoring", val),
            }
        }

        if let Some(val) = env_non_empty("BOXCLUB_API_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.api.timeout_secs = secs,
                Err(_) => eprintln!("Warning: Invalid BOXCLUB_API_TIMEOUT_SECS '{}', ignoring", val),
            }
        }

        // Tenant settings
        if let Some(val) = env_non_empty("BOXCLUB_TENANTS_DIR") {
            self.tenants.directory = Some(val);
        }

        if let Some(val) = env_non_empty("BOXCLUB_DEFAULT_TENANT") {
            self.tenants.default_slug = val;
        }

        if let Some(val) = env_non_empty("BOXCLUB_TENANT_CACHE_TTL_SECS") {
            match val.parse::<u64>() {
                Ok(ttl) => self.tenants.cache_ttl_secs = ttl,
                Err(_) => eprintln!(
                    "Warning: Invalid BOXCLUB_TENANT_CACHE_TTL_SECS '{}', ignoring",
                    val
                ),
            }
        }

        if let Some(val) = env_non_empty("BOXCLUB_ADMIN_TOKEN") {
            self.admin.token = Some(val);
        }

        // Logging settings
        if let Some(val) = env_non_empty("BOXCLUB_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Some(val) = env_non_empty("BOXCLUB_LOG_JSON")
            && let Ok(json) = val.parse::<bool>()
        {
            self.logging.json = json;
        }

        // Server settings
        if let Some(val) = env_non_empty("BOXCLUB_PORT")
            && let Ok(port) = val.parse::<u16>()
        {
            self.port = port;
        }

        if let Some(val) = env_non_empty("BOXCLUB_HOST") {
            self.host = val;
        }
    }

    /// Check values that would only fail later at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !is_valid_slug(&self.tenants.default_slug) {
            return Err(ConfigError::Invalid(format!(
                "tenants.default_slug '{}' is not a valid slug",
                self.tenants.default_slug
            )));
        }

        if self.api.enabled {
            if !(self.api.url.starts_with("http://") || self.api.url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "api.url '{}' must be an http(s) URL",
                    self.api.url
                )));
            }
            if self.api.timeout_secs == 0 {
                return Err(ConfigError::Invalid(
                    "api.timeout_secs must be greater than zero".to_string(),
                ));
            }
        }

        if let Some(token) = &self.admin.token
            && token.trim().is_empty()
        {
            return Err(ConfigError::Invalid(
                "admin.token must not be blank; omit it to disable internal endpoints"
                    .to_string(),
            ));
        }

        if !self.tenants.include_builtin && self.tenants.directory.is_none() {
            return Err(ConfigError::Invalid(
                "no tenant definitions: set tenants.directory or tenants.include_builtin"
                    .to_string(),
            ));
        }

        Ok(())
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    5
}

fn default_connect_timeout_secs() -> u64 {
    2
}

fn default_tenant_slug() -> String {
    "brewjaria".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}
