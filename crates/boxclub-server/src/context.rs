//! Per-request rendering context
//!
//! The middleware resolves the tenant once per request and installs a
//! [`RenderingContext`] as a request extension. Handlers take it with
//! `Extension<RenderingContext>`; nothing downstream reads tenant state from
//! anywhere else.

use axum::{
    Json,
    extract::{Query, Request, State},
    http::{HeaderValue, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use boxclub_core::{TenantConfig, ThemeConfig, ThemeVars};
use boxclub_egress::TenantScope;
use boxclub_routing::{Resolution, ResolveOutcome, ResolveRequest, ResolvedBy};

use crate::app::AppState;

/// Everything a page needs to render for the resolved tenant
#[derive(Debug, Clone)]
pub struct RenderingContext {
    pub resolution: Arc<Resolution>,
    pub request_id: Uuid,
    /// Tenant identity for outbound backend calls
    pub scope: TenantScope,
}

impl RenderingContext {
    pub fn new(resolution: Resolution) -> Self {
        let scope = TenantScope::new(resolution.slug.clone())
            .with_tenant_id(resolution.tenant.id.clone());
        Self {
            resolution: Arc::new(resolution),
            request_id: Uuid::new_v4(),
            scope,
        }
    }

    pub fn tenant(&self) -> &TenantConfig {
        &self.resolution.tenant
    }

    pub fn theme(&self) -> &ThemeConfig {
        &self.resolution.theme
    }

    pub fn theme_vars(&self) -> &ThemeVars {
        &self.resolution.theme_vars
    }

    pub fn resolved_by(&self) -> ResolvedBy {
        self.resolution.resolved_by
    }
}

#[derive(Debug, Deserialize)]
struct TenantQuery {
    tenant: Option<String>,
}

/// Collect host, path and `tenant` parameter from an incoming request
pub fn resolve_request_from(req: &Request) -> ResolveRequest {
    let uri = req.uri();
    let host = req
        .headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .map(str::to_string)
        // HTTP/2 carries the authority in the URI
        .or_else(|| uri.authority().map(|a| a.to_string()));

    // A malformed query string only loses the parameter
    let tenant_param = Query::<TenantQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.tenant)
        .filter(|t| !t.trim().is_empty());

    ResolveRequest {
        host,
        path: Some(uri.path().to_string()),
        tenant_param,
    }
}

/// Strict resolution: unknown tenants get 404, suspended tenants 503
pub async fn resolve_tenant(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let request = resolve_request_from(&req);
    let outcome = state.resolver.resolve(&request).await;
    continue_with(outcome, &request, req, next).await
}

/// Defaulting resolution: unknown tenants get the default tenant
pub async fn resolve_tenant_or_default(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let request = resolve_request_from(&req);
    let outcome = state.resolver.resolve_or_default(&request).await;
    continue_with(outcome, &request, req, next).await
}

async fn continue_with(
    outcome: ResolveOutcome,
    request: &ResolveRequest,
    mut req: Request,
    next: Next,
) -> Response {
    match outcome {
        ResolveOutcome::Resolved(resolution) => {
            let context = RenderingContext::new(*resolution);
            debug!(
                request_id = %context.request_id,
                tenant = %context.scope.slug,
                resolved_by = %context.resolved_by(),
                "Tenant resolved"
            );
            let request_id = context.request_id;
            req.extensions_mut().insert(context);

            let mut response = next.run(req).await;
            if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
                response.headers_mut().insert("x-request-id", value);
            }
            response
        }
        ResolveOutcome::Suspended { slug, message } => {
            info!("Refusing request for suspended tenant '{}'", slug);
            suspended_response(message)
        }
        ResolveOutcome::NotFound => {
            debug!("No tenant for host {:?} path {:?}", request.host, request.path);
            not_found_response()
        }
    }
}

pub fn not_found_response() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "tenant_not_found",
            "tenant": null,
        })),
    )
        .into_response()
}

pub fn suspended_response(message: Option<String>) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "error": "tenant_suspended",
            "tenant": null,
            "suspended": true,
            "message": message,
        })),
    )
        .into_response()
}
