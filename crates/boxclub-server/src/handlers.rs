//! HTTP handlers
//!
//! Tenant-scoped handlers take the [`RenderingContext`] installed by the
//! resolution middleware; they never resolve tenants themselves.

use axum::{
    Extension, Json,
    extract::{Path, RawQuery, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use boxclub_core::tenant::{CheckoutMode, HeroSection};
use boxclub_core::theme::theme_vars;
use boxclub_core::{TenantConfig, ThemeConfig, ThemeVars};
use boxclub_egress::EgressError;
use boxclub_routing::ResolvedBy;

use crate::app::AppState;
use crate::context::RenderingContext;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantInfoResponse<'a> {
    pub tenant: &'a TenantConfig,
    pub resolved_by: ResolvedBy,
    pub theme: &'a str,
    pub theme_vars: &'a ThemeVars,
}

/// `GET /api/tenant`
pub async fn tenant_info(Extension(ctx): Extension<RenderingContext>) -> Response {
    Json(TenantInfoResponse {
        tenant: ctx.tenant(),
        resolved_by: ctx.resolved_by(),
        theme: &ctx.theme().slug,
        theme_vars: ctx.theme_vars(),
    })
    .into_response()
}

/// `GET /api/tenant/theme.css`
pub async fn theme_css(Extension(ctx): Extension<RenderingContext>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        ctx.theme_vars().to_css(":root"),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataResponse<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub keywords: &'a [String],
    pub og_image: Option<&'a str>,
    pub favicon: Option<&'a str>,
    pub site_name: &'a str,
}

/// `GET /api/metadata`
pub async fn metadata(Extension(ctx): Extension<RenderingContext>) -> Response {
    let tenant = ctx.tenant();
    let description = if tenant.seo.description.is_empty() {
        tenant.branding.description.as_str()
    } else {
        tenant.seo.description.as_str()
    };

    Json(MetadataResponse {
        title: &tenant.seo.title,
        description,
        keywords: &tenant.seo.keywords,
        og_image: tenant.seo.og_image.as_deref(),
        favicon: tenant.branding.favicon.as_deref(),
        site_name: &tenant.name,
    })
    .into_response()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<f64>,
    pub features: &'a [String],
    pub highlighted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<&'a str>,
    pub checkout_url: Option<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontResponse<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub tagline: &'a str,
    pub hero: &'a HeroSection,
    pub plans: Vec<PlanView<'a>>,
    pub features: Vec<&'a str>,
    pub currency: &'a str,
    pub checkout_mode: CheckoutMode,
    pub cta_label: &'a str,
    pub resolved_by: ResolvedBy,
}

/// `GET /t/{slug}` and `GET /t/{slug}/{*rest}`
///
/// The path slug only feeds resolution; the body describes whichever tenant
/// the middleware settled on.
pub async fn storefront(Extension(ctx): Extension<RenderingContext>) -> Response {
    let tenant = ctx.tenant();
    let plans = tenant
        .plans
        .iter()
        .map(|plan| PlanView {
            id: &plan.id,
            name: &plan.name,
            price: plan.price,
            original_price: plan.original_price,
            features: &plan.features,
            highlighted: plan.highlighted,
            badge: plan.badge.as_deref(),
            checkout_url: tenant.checkout_url(&plan.id),
        })
        .collect();

    Json(StorefrontResponse {
        slug: &tenant.slug,
        name: &tenant.name,
        tagline: &tenant.branding.tagline,
        hero: &tenant.hero,
        plans,
        features: tenant.enabled_features(),
        currency: &tenant.subscription.currency,
        checkout_mode: tenant.subscription.mode,
        cta_label: &tenant.subscription.cta_label,
        resolved_by: ctx.resolved_by(),
    })
    .into_response()
}

fn backend_error(message: impl Into<String>) -> Response {
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({
            "error": "backend_error",
            "message": message.into(),
        })),
    )
        .into_response()
}

/// `GET /api/backend/{*path}`
pub async fn backend_proxy(
    State(state): State<AppState>,
    Extension(ctx): Extension<RenderingContext>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> Response {
    let Some(backend) = &state.backend else {
        return backend_error("backend is disabled");
    };

    match backend
        .get_json_with_query::<Value>(&ctx.scope, &path, query.as_deref())
        .await
    {
        Ok(body) => Json(body).into_response(),
        Err(EgressError::InvalidPath(message)) => {
            warn!(
                request_id = %ctx.request_id,
                tenant = %ctx.scope.slug,
                "Refused backend path: {}",
                message
            );
            (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "invalid_path",
                    "message": message,
                })),
            )
                .into_response()
        }
        Err(e) => {
            warn!(
                request_id = %ctx.request_id,
                tenant = %ctx.scope.slug,
                "Backend call to '{}' failed: {}",
                path,
                e
            );
            backend_error(e.to_string())
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeTokensResponse<'a> {
    pub theme: &'a ThemeConfig,
    pub vars: ThemeVars,
    /// The requested slug was unknown and the default theme was served
    pub fallback: bool,
}

/// `GET /api/themes/{slug}`
pub async fn theme_tokens(State(state): State<AppState>, Path(slug): Path<String>) -> Response {
    let theme = state.themes.get_theme(&slug);
    Json(ThemeTokensResponse {
        theme,
        vars: theme_vars(theme),
        fallback: !state.themes.contains(&slug),
    })
    .into_response()
}

/// `POST /internal/tenants/{slug}/invalidate`
pub async fn invalidate_tenant(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> StatusCode {
    match &state.cache {
        Some(cache) => {
            let removed = cache.invalidate(&slug);
            info!("Invalidated cached tenant '{}' (present: {})", slug, removed);
        }
        None => info!("Invalidate for '{}' ignored, backend disabled", slug),
    }
    StatusCode::NO_CONTENT
}
