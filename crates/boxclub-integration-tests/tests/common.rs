//! Common test utilities for integration tests

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

use boxclub_observability::Metrics;
use boxclub_server::{AppState, ServerConfig, build_state};

/// Admin token configured by `state_for`
#[allow(dead_code)]
pub const ADMIN_TOKEN: &str = "test-admin-token";

/// Server state pointed at a mock backend
#[allow(dead_code)]
pub fn state_for(server: &MockServer, cache_ttl_secs: u64) -> AppState {
    state_for_url(&server.uri(), cache_ttl_secs)
}

/// Server state pointed at an explicit backend base URL
#[allow(dead_code)]
pub fn state_for_url(api_url: &str, cache_ttl_secs: u64) -> AppState {
    let mut config = ServerConfig::default();
    config.api.url = api_url.to_string();
    config.api.timeout_secs = 2;
    config.tenants.cache_ttl_secs = cache_ttl_secs;
    config.admin.token = Some(ADMIN_TOKEN.to_string());
    build_state(&config, Arc::new(Metrics::new().unwrap())).unwrap()
}

/// GET through the router, returning status and JSON body
#[allow(dead_code)]
pub async fn get_json(app: Router, host: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("host", host)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

/// POST through the router, with an optional bearer token
#[allow(dead_code)]
pub async fn post(app: Router, uri: &str, token: Option<&str>) -> StatusCode {
    let mut request = Request::builder().method("POST").uri(uri);
    if let Some(token) = token {
        request = request.header("authorization", format!("Bearer {}", token));
    }
    app.oneshot(request.body(Body::empty()).unwrap())
    .await
    .unwrap()
    .status()
}

/// Backend payload for a found dynamic tenant
#[allow(dead_code)]
pub fn found_tenant(slug: &str, name: &str) -> Value {
    json!({
        "found": true,
        "tenant": {
            "id": format!("tenant-{}", slug),
            "slug": slug,
            "name": name,
            "themeSlug": "wine",
            "primaryColor": "#7b1e3a"
        },
        "plans": [
            { "id": "mensal", "name": "Mensal", "priceCents": 14990 }
        ]
    })
}
