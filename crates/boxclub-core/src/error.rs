//! Error types for BoxClub Core

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    // Tenant errors
    #[error("Invalid tenant: {0}")]
    InvalidTenant(String),

    #[error("Duplicate tenant slug: {0}")]
    DuplicateSlug(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    /// The backend could not be reached or answered with something unusable
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
