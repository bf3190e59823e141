//! Shared-token guard for internal endpoints
//!
//! Internal routes (`/internal/...`) require `Authorization: Bearer <token>`
//! matching `admin.token`. Without a configured token they are refused
//! outright.

use axum::{
    Json,
    extract::{Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use crate::app::AppState;

fn refusal(status: StatusCode, error: &str) -> Response {
    (status, Json(json!({ "error": error }))).into_response()
}

/// Compare without short-circuiting on the first differing byte
fn token_matches(expected: &str, presented: &str) -> bool {
    expected.len() == presented.len()
        && expected
            .bytes()
            .zip(presented.bytes())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
}

/// Middleware requiring the admin bearer token
pub async fn require_admin_token(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.admin_token.as_deref() else {
        warn!("Refusing {} {}: no admin token configured", req.method(), req.uri().path());
        return refusal(StatusCode::FORBIDDEN, "admin_disabled");
    };

    let authorized = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token_matches(expected, token.trim()));

    match authorized {
        Some(true) => next.run(req).await,
        Some(false) => {
            warn!("Refusing {} {}: invalid admin token", req.method(), req.uri().path());
            refusal(StatusCode::UNAUTHORIZED, "invalid_token")
        }
        None => refusal(StatusCode::UNAUTHORIZED, "missing_token"),
    }
}
