//! BoxClub Egress
//!
//! This crate talks to the BoxClub backend API:
//! - Shared HTTP client configuration
//! - Backend wire types for the tenant-lookup endpoint
//! - Adapter from the API tenant shape to `TenantConfig`
//! - `ApiTenantFetcher`, the dynamic tenant source
//! - `BackendClient`, for tenant-scoped outbound calls

pub mod adapter;
pub mod api;
pub mod backend;
pub mod client;
pub mod fetcher;

pub use adapter::adapt_api_tenant;
pub use backend::{BackendClient, TENANT_ID_HEADER, TENANT_SLUG_HEADER, TenantScope};
pub use client::{HttpClientConfig, create_client};
pub use fetcher::{ApiConfig, ApiTenantFetcher};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EgressError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Backend error {status_code}: {message}")]
    BackendError { status_code: u16, message: String },

    #[error("Request timeout after {0}s")]
    Timeout(u64),

    #[error("Invalid backend response: {0}")]
    InvalidResponse(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid backend path: {0}")]
    InvalidPath(String),
}

pub type Result<T> = std::result::Result<T, EgressError>;

impl From<EgressError> for boxclub_core::Error {
    fn from(err: EgressError) -> Self {
        match err {
            EgressError::ConfigError(msg) => boxclub_core::Error::Config(msg),
            other => boxclub_core::Error::Upstream(other.to_string()),
        }
    }
}
