//! Tenant resolution through the full router
//!
//! Static definitions are the built-in `brewjaria` and `grao-mestre`
//! tenants; dynamic tenants come from a wiremock backend.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use boxclub_observability::Metrics;
use boxclub_server::{ServerConfig, build_state, router};
use common::{ADMIN_TOKEN, found_tenant, get_json, post, state_for};

#[tokio::test]
async fn test_dedicated_domain_wins_over_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(
        router(state),
        "graomestre.com.br",
        "/api/tenant?tenant=brewjaria",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"]["slug"], "grao-mestre");
    assert_eq!(body["resolvedBy"], "domain");
}

#[tokio::test]
async fn test_static_slug_never_calls_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(found_tenant("brewjaria", "Impostor")))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(router(state), "loja.example.com", "/t/brewjaria").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Brewjaria");
    assert_eq!(body["resolvedBy"], "static");
}

#[tokio::test]
async fn test_dynamic_tenant_from_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/vinho-da-casa"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(found_tenant("vinho-da-casa", "Vinho da Casa")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(
        router(state.clone()),
        "loja.example.com",
        "/api/tenant?tenant=vinho-da-casa",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resolvedBy"], "dynamic");
    assert_eq!(body["theme"], "wine");
    assert_eq!(body["themeVars"]["--primary"], "#7b1e3a");
    assert_eq!(body["themeVars"]["--ring"], "#7b1e3a");
    assert_eq!(body["tenant"]["plans"][0]["price"], 149.9);
    assert_eq!(state.metrics.resolutions("dynamic"), 1.0);
}

#[tokio::test]
async fn test_suspended_tenant_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/fechado"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "suspended": true,
            "message": "Assinaturas pausadas"
        })))
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(router(state), "localhost:3000", "/t/fechado").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "tenant_suspended");
    assert_eq!(body["suspended"], true);
    assert_eq!(body["message"], "Assinaturas pausadas");
}

#[tokio::test]
async fn test_upstream_failure_looks_like_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/instavel"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(router(state.clone()), "loja.example.com", "/t/instavel").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "tenant_not_found");
    assert_eq!(state.metrics.upstream_failures("api"), 1.0);

    // Static tenants keep serving; readiness flags the backend
    let (status, body) = get_json(router(state), "localhost", "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["sources"][1]["name"], "api");
    assert_eq!(body["sources"][1]["state"], "degraded");
}

#[tokio::test]
async fn test_local_host_falls_back_after_backend_miss() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/desconhecido"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server, 0);
    let (status, body) = get_json(router(state), "localhost:3000", "/t/desconhecido").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], "brewjaria");
    assert_eq!(body["resolvedBy"], "fallback");
}

#[tokio::test]
async fn test_unknown_public_host_strict_and_defaulting() {
    let server = MockServer::start().await;
    let state = state_for(&server, 0);

    let (status, _) = get_json(router(state.clone()), "shop.example.com", "/api/tenant").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = get_json(router(state), "shop.example.com", "/api/metadata").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["siteName"], "Brewjaria");
}

#[tokio::test]
async fn test_cache_serves_repeat_lookups_until_invalidated() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/vinho-da-casa"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(found_tenant("vinho-da-casa", "Vinho da Casa")),
        )
        .expect(2)
        .mount(&server)
        .await;

    let state = state_for(&server, 300);
    for _ in 0..2 {
        let (status, _) =
            get_json(router(state.clone()), "loja.example.com", "/t/vinho-da-casa").await;
        assert_eq!(status, StatusCode::OK);
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);

    let status = post(
        router(state.clone()),
        "/internal/tenants/vinho-da-casa/invalidate",
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = get_json(router(state), "loja.example.com", "/t/vinho-da-casa").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_tenant_directory_adds_domains() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("vinil.toml"),
        r#"
id = "tenant-vinil"
slug = "clube-do-vinil"
name = "Clube do Vinil"
domains = ["clubedovinil.com.br"]
themeSlug = "dark"

[branding]
logo = "/vinil.svg"
tagline = "Discos todo mês"
description = "Vinis selecionados"

[branding.brandText]
line1 = "Clube"
line2 = "do Vinil"

[hero]
title = "Vinil"
subtitle = "Todo mês"
cta = "Assinar"
"#,
    )
    .unwrap();

    let mut config = ServerConfig::default();
    config.api.enabled = false;
    config.tenants.directory = Some(dir.path().display().to_string());
    let state = build_state(&config, Arc::new(Metrics::new().unwrap())).unwrap();

    let (status, body) = get_json(router(state), "ClubeDoVinil.com.br:443", "/api/tenant").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"]["slug"], "clube-do-vinil");
    assert_eq!(body["theme"], "dark");
}

#[tokio::test]
async fn test_invalidate_requires_admin_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tenants/vinho-da-casa"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(found_tenant("vinho-da-casa", "Vinho da Casa")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let state = state_for(&server, 300);
    let (status, _) = get_json(router(state.clone()), "loja.example.com", "/t/vinho-da-casa").await;
    assert_eq!(status, StatusCode::OK);

    let uri = "/internal/tenants/vinho-da-casa/invalidate";
    assert_eq!(post(router(state.clone()), uri, None).await, StatusCode::UNAUTHORIZED);
    assert_eq!(
        post(router(state.clone()), uri, Some("wrong-token")).await,
        StatusCode::UNAUTHORIZED
    );

    // Still cached: the refused calls evicted nothing
    let (status, _) = get_json(router(state), "loja.example.com", "/t/vinho-da-casa").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_invalidate_refused_without_configured_token() {
    let server = MockServer::start().await;
    let mut state = state_for(&server, 300);
    state.admin_token = None;

    let status = post(
        router(state),
        "/internal/tenants/vinho-da-casa/invalidate",
        Some(ADMIN_TOKEN),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_percent_encoded_tenant_param() {
    let server = MockServer::start().await;
    let state = state_for(&server, 0);

    let (status, body) = get_json(
        router(state),
        "localhost:3000",
        "/api/tenant?utm_source=ig&tenant=grao%2Dmestre",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"]["slug"], "grao-mestre");
}
