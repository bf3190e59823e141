//! BoxClub Observability
//!
//! This crate provides observability features:
//! - Tenant resolution metrics (Prometheus)
//! - Structured logging setup
//! - Health endpoints

pub mod health;
pub mod logging;
pub mod metrics;

pub use health::{
    HealthState, Readiness, ReadinessChecker, SourceState, SourceStatus, health_router,
    overall_readiness,
};
pub use logging::{build_env_filter, init_logging};
pub use metrics::Metrics;
