//! Dynamic tenant fetcher
//!
//! Looks up tenants that are not in the static registry by calling the
//! backend tenant-lookup endpoint. Every call goes to the backend: tenant
//! state such as suspension can change between requests.

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use boxclub_core::{TenantLookup, TenantSource, is_valid_slug};

use crate::adapter::adapt_api_tenant;
use crate::api::ApiTenantResponse;
use crate::client::{HttpClientConfig, create_client};
use crate::{EgressError, Result};

/// Backend API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Base URL, e.g. `http://localhost:3001/api`
    pub base_url: String,
    pub client_config: HttpClientConfig,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_config: HttpClientConfig::default(),
        }
    }
}

/// Fetches tenant definitions from the backend
pub struct ApiTenantFetcher {
    client: Client,
    base_url: String,
    timeout_secs: u64,
}

impl ApiTenantFetcher {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = create_client(&config.client_config)?;
        Ok(Self::with_client(
            client,
            config.base_url,
            config.client_config.timeout_secs,
        ))
    }

    /// Reuse an existing HTTP client
    pub fn with_client(client: Client, base_url: impl Into<String>, timeout_secs: u64) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client,
            base_url,
            timeout_secs,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tenant_url(&self, slug: &str) -> String {
        format!("{}/tenants/{}", self.base_url, slug)
    }

    /// Fetch one tenant by slug
    ///
    /// - `NotFound` for an unknown tenant (HTTP 404 or `found: false`), and
    ///   for a slug that is not URL-safe (no request is made)
    /// - `Suspended` when the backend flags the tenant as suspended
    /// - `Found` with the adapted configuration otherwise
    ///
    /// # Errors
    /// Transport failures, timeouts, unexpected statuses and undecodable
    /// bodies are returned as `EgressError`; no retry is attempted.
    pub async fn fetch_tenant(&self, slug: &str) -> Result<TenantLookup> {
        if !is_valid_slug(slug) {
            debug!("Not fetching tenant for invalid slug '{}'", slug);
            return Ok(TenantLookup::NotFound);
        }

        let url = self.tenant_url(slug);
        debug!("Fetching tenant '{}' from {}", slug, url);

        let response = self
            .client
            .get(&url)
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        debug!("Tenant lookup for '{}' returned {}", slug, status);

        match status {
            s if s.is_success() => {
                let body: ApiTenantResponse = response.json().await.map_err(|e| {
                    EgressError::InvalidResponse(format!(
                        "tenant lookup for '{}' returned an undecodable body: {}",
                        slug, e
                    ))
                })?;
                Ok(Self::interpret(slug, body))
            }
            StatusCode::NOT_FOUND | StatusCode::FORBIDDEN | StatusCode::GONE => {
                // Error statuses may still carry a suspension notice
                let body = response.json::<ApiTenantResponse>().await.ok();
                match body {
                    Some(body) if body.is_suspended() => Ok(TenantLookup::Suspended {
                        message: body.message,
                    }),
                    _ if status == StatusCode::NOT_FOUND => Ok(TenantLookup::NotFound),
                    _ => Err(EgressError::BackendError {
                        status_code: status.as_u16(),
                        message: format!("tenant lookup for '{}' was refused", slug),
                    }),
                }
            }
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
                Err(EgressError::BackendError {
                    status_code: status.as_u16(),
                    message,
                })
            }
        }
    }

    fn interpret(slug: &str, body: ApiTenantResponse) -> TenantLookup {
        if body.is_suspended() {
            debug!("Tenant '{}' is suspended", slug);
            return TenantLookup::Suspended {
                message: body.message,
            };
        }

        match body.tenant {
            Some(tenant) if body.found => {
                if tenant.slug != slug {
                    warn!(
                        "Backend answered lookup for '{}' with tenant '{}'",
                        slug, tenant.slug
                    );
                }
                TenantLookup::found(adapt_api_tenant(tenant, body.plans.unwrap_or_default()))
            }
            _ => TenantLookup::NotFound,
        }
    }

    fn map_transport_error(&self, err: reqwest::Error) -> EgressError {
        if err.is_timeout() {
            EgressError::Timeout(self.timeout_secs)
        } else {
            EgressError::HttpError(err)
        }
    }
}

#[async_trait]
impl TenantSource for ApiTenantFetcher {
    fn name(&self) -> &str {
        "api"
    }

    async fn lookup_slug(&self, slug: &str) -> boxclub_core::Result<TenantLookup> {
        Ok(self.fetch_tenant(slug).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn fetcher_for(server: &MockServer) -> ApiTenantFetcher {
        ApiTenantFetcher::new(ApiConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn test_found_tenant_is_adapted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/vinho-da-casa"))
            .and(header("cache-control", "no-cache"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "found": true,
                "tenant": { "id": "t1", "slug": "vinho-da-casa", "name": "Vinho da Casa" },
                "plans": [ { "id": "p1", "name": "Tinto", "priceCents": 12990 } ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let lookup = fetcher_for(&server)
            .await
            .fetch_tenant("vinho-da-casa")
            .await
            .unwrap();

        let tenant = lookup.tenant().unwrap();
        assert_eq!(tenant.slug, "vinho-da-casa");
        assert_eq!(tenant.hero.title, "Bem-vindo ao Vinho da Casa");
        assert_eq!(tenant.plans.len(), 1);
    }

    #[tokio::test]
    async fn test_found_false_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/ghost"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "found": false })))
            .mount(&server)
            .await;

        let lookup = fetcher_for(&server).await.fetch_tenant("ghost").await.unwrap();
        assert!(lookup.is_not_found());
    }

    #[tokio::test]
    async fn test_http_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/ghost"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let lookup = fetcher_for(&server).await.fetch_tenant("ghost").await.unwrap();
        assert!(lookup.is_not_found());
    }

    #[tokio::test]
    async fn test_suspended_tenant() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/paused"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "found": true,
                "suspended": true,
                "message": "Loja temporariamente indisponível"
            })))
            .mount(&server)
            .await;

        let lookup = fetcher_for(&server).await.fetch_tenant("paused").await.unwrap();
        match lookup {
            TenantLookup::Suspended { message } => {
                assert_eq!(message.as_deref(), Some("Loja temporariamente indisponível"));
            }
            other => panic!("expected Suspended, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_suspended_on_forbidden_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/paused"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(json!({ "suspended": true })),
            )
            .mount(&server)
            .await;

        let lookup = fetcher_for(&server).await.fetch_tenant("paused").await.unwrap();
        assert!(lookup.is_suspended());
    }

    #[tokio::test]
    async fn test_forbidden_without_suspension_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/club"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let result = fetcher_for(&server).await.fetch_tenant("club").await;
        assert!(matches!(
            result,
            Err(EgressError::BackendError { status_code: 403, .. })
        ));
    }

    #[tokio::test]
    async fn test_server_error_is_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/club"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let result = fetcher_for(&server).await.fetch_tenant("club").await;
        match result {
            Err(EgressError::BackendError {
                status_code,
                message,
            }) => {
                assert_eq!(status_code, 503);
                assert_eq!(message, "maintenance");
            }
            other => panic!("expected BackendError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/club"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let result = fetcher_for(&server).await.fetch_tenant("club").await;
        assert!(matches!(result, Err(EgressError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_invalid_slug_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server).await;
        assert!(fetcher.fetch_tenant("../admin").await.unwrap().is_not_found());
        assert!(fetcher.fetch_tenant("UPPER").await.unwrap().is_not_found());
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_error() {
        // Nothing listens on port 9 (discard) in the test environment
        let fetcher = ApiTenantFetcher::new(ApiConfig::new("http://127.0.0.1:9")).unwrap();
        assert!(fetcher.fetch_tenant("club").await.is_err());
    }

    #[tokio::test]
    async fn test_tenant_source_maps_errors_to_upstream() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/tenants/club"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server).await;
        let result = fetcher.lookup_slug("club").await;
        assert!(matches!(result, Err(boxclub_core::Error::Upstream(_))));
        assert_eq!(fetcher.name(), "api");
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let fetcher = ApiTenantFetcher::new(ApiConfig::new("http://api.local/api/")).unwrap();
        assert_eq!(fetcher.base_url(), "http://api.local/api");
        assert_eq!(
            fetcher.tenant_url("club"),
            "http://api.local/api/tenants/club"
        );
    }
}
