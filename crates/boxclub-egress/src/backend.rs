//! Tenant-scoped backend client
//!
//! Outbound calls made while rendering a tenant's page carry the resolved
//! tenant explicitly in request headers instead of relying on the backend
//! to infer it from the origin.

use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::client::create_client;
use crate::fetcher::ApiConfig;
use crate::{EgressError, Result};

/// Header carrying the tenant slug on backend requests
pub const TENANT_SLUG_HEADER: &str = "x-tenant-slug";
/// Header carrying the tenant id on backend requests, when known
pub const TENANT_ID_HEADER: &str = "x-tenant-id";

/// The tenant a backend call is made on behalf of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantScope {
    pub slug: String,
    pub tenant_id: Option<String>,
}

impl TenantScope {
    pub fn new(slug: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            tenant_id: None,
        }
    }

    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }
}

/// HTTP client for tenant-scoped backend calls
///
/// Every URL it builds stays below the configured base URL: paths are
/// appended segment by segment and dot segments are refused.
#[derive(Clone)]
pub struct BackendClient {
    client: Client,
    base_url: Url,
}

impl BackendClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|e| {
            EgressError::ConfigError(format!("Invalid backend URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(EgressError::ConfigError(format!(
                "Backend URL '{}' cannot carry a path",
                config.base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve `path` (and an already encoded query) below the base URL
    ///
    /// # Errors
    /// `EgressError::InvalidPath` if a segment is `.`/`..` or holds a
    /// backslash, or if the result would leave the base URL.
    pub fn url(&self, path: &str, query: Option<&str>) -> Result<Url> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(**s, "." | "..") || s.contains('\\'))
        {
            return Err(EgressError::InvalidPath(format!(
                "segment '{}' is not allowed in '{}'",
                bad, path
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| EgressError::InvalidPath(path.to_string()))?
            .pop_if_empty()
            .extend(segments);
        url.set_query(query.filter(|q| !q.is_empty()));

        if url.origin() != self.base_url.origin() || !url.path().starts_with(self.base_url.path()) {
            return Err(EgressError::InvalidPath(format!(
                "'{}' resolves outside {}",
                path, self.base_url
            )));
        }
        Ok(url)
    }

    /// Start a request below the base URL with the tenant headers set
    pub fn request(
        &self,
        scope: &TenantScope,
        method: Method,
        path: &str,
        query: Option<&str>,
    ) -> Result<RequestBuilder> {
        let url = self.url(path, query)?;
        let mut builder = self
            .client
            .request(method, url)
            .header(TENANT_SLUG_HEADER, &scope.slug);
        if let Some(id) = &scope.tenant_id {
            builder = builder.header(TENANT_ID_HEADER, id);
        }
        Ok(builder)
    }

    /// GET a JSON document on behalf of a tenant
    pub async fn get_json<T: DeserializeOwned>(&self, scope: &TenantScope, path: &str) -> Result<T> {
        self.get_json_with_query(scope, path, None).await
    }

    /// GET a JSON document, forwarding a raw query string
    pub async fn get_json_with_query<T: DeserializeOwned>(
        &self,
        scope: &TenantScope,
        path: &str,
        query: Option<&str>,
    ) -> Result<T> {
        debug!("Backend GET {} for tenant '{}'", path, scope.slug);

        let response = self.request(scope, Method::GET, path, query)?.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EgressError::BackendError {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| EgressError::InvalidResponse(e.to_string()))
    }
}
