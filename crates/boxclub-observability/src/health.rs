//! Health endpoints
//!
//! This module provides HTTP health check endpoints:
//! - `/healthz` - Liveness check (always returns 200 OK if server is running)
//! - `/readyz` - Readiness check (`ready`, `degraded` or `not_ready` from the tenant sources)
//! - `/metrics` - Prometheus metrics endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use prometheus::TextEncoder;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::metrics::Metrics;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall readiness, derived from the tenant sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    /// Serving, but an optional source is failing
    Degraded,
    NotReady,
}

/// Readiness check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: Readiness,
    /// Tenant source statuses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SourceStatus>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// State of one tenant source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceState {
    Ready,
    /// Reachable but failing recently; lookups fall through to other sources
    Degraded,
    /// Cannot serve any tenant
    Unavailable,
    /// Turned off by configuration
    Disabled,
}

/// Status of one tenant source in the readiness check
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatus {
    /// Source name (`static`, `api`, ...)
    pub name: String,
    pub state: SourceState,
    /// The server cannot serve tenants without this source
    pub required: bool,
    /// Number of tenants the source holds, when it is enumerable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenants: Option<usize>,
    /// Seconds since the source last failed a lookup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_failure_secs_ago: Option<u64>,
}

impl SourceStatus {
    pub fn new(name: impl Into<String>, state: SourceState, required: bool) -> Self {
        Self {
            name: name.into(),
            state,
            required,
            tenants: None,
            last_failure_secs_ago: None,
        }
    }

    pub fn with_tenants(mut self, tenants: usize) -> Self {
        self.tenants = Some(tenants);
        self
    }

    pub fn with_last_failure(mut self, secs_ago: Option<u64>) -> Self {
        self.last_failure_secs_ago = secs_ago;
        self
    }
}

/// Reports the state of every tenant source
pub trait ReadinessChecker: Send + Sync {
    fn sources(&self) -> Vec<SourceStatus>;
}

/// Not ready if a required source is unavailable, degraded if any source is
/// degraded or an optional one is unavailable
pub fn overall_readiness(sources: &[SourceStatus]) -> Readiness {
    if sources
        .iter()
        .any(|s| s.required && s.state == SourceState::Unavailable)
    {
        Readiness::NotReady
    } else if sources
        .iter()
        .any(|s| matches!(s.state, SourceState::Degraded | SourceState::Unavailable))
    {
        Readiness::Degraded
    } else {
        Readiness::Ready
    }
}

fn names_in(sources: &[SourceStatus], states: &[SourceState]) -> String {
    sources
        .iter()
        .filter(|s| states.contains(&s.state))
        .map(|s| s.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub metrics: Arc<Metrics>,
    pub readiness_checker: Option<Arc<dyn ReadinessChecker>>,
}

impl HealthState {
    pub fn new(metrics: Arc<Metrics>) -> Self {
        Self {
            metrics,
            readiness_checker: None,
        }
    }

    pub fn with_readiness_checker(
        metrics: Arc<Metrics>,
        readiness_checker: Arc<dyn ReadinessChecker>,
    ) -> Self {
        Self {
            metrics,
            readiness_checker: Some(readiness_checker),
        }
    }
}

/// Create health check router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

/// Liveness check handler
async fn healthz() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: None,
    })
}

/// Readiness check handler
///
/// 503 only when a required source cannot serve tenants; a degraded
/// optional source still answers 200 with `status: degraded`.
async fn readyz(State(state): State<HealthState>) -> Response {
    let Some(checker) = &state.readiness_checker else {
        return (
            StatusCode::OK,
            Json(ReadinessResponse {
                status: Readiness::Ready,
                sources: None,
                message: None,
            }),
        )
            .into_response();
    };

    let sources = checker.sources();
    let status = overall_readiness(&sources);
    let (code, message) = match status {
        Readiness::Ready => (StatusCode::OK, None),
        Readiness::Degraded => (
            StatusCode::OK,
            Some(format!(
                "Tenant sources degraded: {}",
                names_in(&sources, &[SourceState::Degraded, SourceState::Unavailable])
            )),
        ),
        Readiness::NotReady => (
            StatusCode::SERVICE_UNAVAILABLE,
            Some(format!(
                "Tenant sources unavailable: {}",
                names_in(&sources, &[SourceState::Unavailable])
            )),
        ),
    };

    (
        code,
        Json(ReadinessResponse {
            status,
            sources: Some(sources),
            message,
        }),
    )
        .into_response()
}

/// Prometheus metrics handler
async fn metrics_handler(State(state): State<HealthState>) -> Response {
    let encoder = TextEncoder::new();
    let metric_families = state.metrics.registry().gather();

    match encoder.encode_to_string(&metric_families) {
        Ok(body) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Failed to encode metrics: {}", err),
        )
            .into_response(),
    }
}
