//! Tenant-scoped backend calls
//!
//! Outbound calls made on behalf of a request carry the resolved tenant's
//! identity headers.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use tokio::net::TcpListener;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use boxclub_egress::{ApiConfig, BackendClient, TENANT_SLUG_HEADER, TenantScope};
use boxclub_server::router;
use common::{get_json, state_for, state_for_url};

#[tokio::test]
async fn test_proxy_forwards_resolved_tenant_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders/recent"))
        .and(header("x-tenant-slug", "grao-mestre"))
        .and(header("x-tenant-id", "tenant-grao-mestre"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orders": [1, 2] })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(
        router(state),
        "graomestre.com.br",
        "/api/backend/orders/recent",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"], json!([1, 2]));
}

#[tokio::test]
async fn test_proxy_backend_failure_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(router(state), "localhost", "/api/backend/orders").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "backend_error");
}

#[tokio::test]
async fn test_proxy_forwards_query_string() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .and(query_param("page", "2"))
        .and(query_param("status", "em aberto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "page": 2 })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(
        router(state),
        "localhost",
        "/api/backend/orders?page=2&status=em%20aberto",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 2);
}

#[tokio::test]
async fn test_proxy_cannot_leave_backend_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/admin/secrets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "leaked": true })))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "orders": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for_url(&format!("{}/api", server.uri()), 0);

    for uri in [
        "/api/backend/..%2Fadmin%2Fsecrets",
        "/api/backend/orders/..%2F..%2Fadmin%2Fsecrets",
        "/api/backend/%2E%2E/admin/secrets",
    ] {
        let (status, body) = get_json(router(state.clone()), "localhost", uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"], "invalid_path");
    }

    let (status, _) = get_json(router(state), "localhost", "/api/backend/orders").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_proxy_for_unknown_tenant_is_not_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, _) = get_json(router(state), "shop.example.com", "/api/backend/orders").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_concurrent_scopes_do_not_leak() {
    let server = MockServer::start().await;
    for slug in ["brewjaria", "grao-mestre"] {
        Mock::given(method("GET"))
            .and(path("/whoami"))
            .and(header(TENANT_SLUG_HEADER, slug))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "slug": slug })))
            .mount(&server)
            .await;
    }

    let client = BackendClient::new(ApiConfig::new(server.uri())).unwrap();
    let mut handles = Vec::new();
    for i in 0..20 {
        let client = client.clone();
        let slug = if i % 2 == 0 { "brewjaria" } else { "grao-mestre" };
        handles.push(tokio::spawn(async move {
            let scope = TenantScope::new(slug);
            let body: serde_json::Value = client.get_json(&scope, "whoami").await.unwrap();
            (slug, body)
        }));
    }

    for handle in handles {
        let (slug, body) = handle.await.unwrap();
        assert_eq!(body["slug"], slug);
    }
}

#[tokio::test]
async fn test_served_over_tcp() {
    let server = MockServer::start().await;
    let app = router(state_for(&server, 0));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::new();
    let response = client
        .get(format!("http://{}/api/tenant", addr))
        .header("host", "brewjaria.com.br")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["tenant"]["slug"], "brewjaria");

    let response = client
        .get(format!("http://{}/healthz", addr))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}
