//! Structured logging setup
//!
//! Installs the global `tracing` subscriber. `RUST_LOG`, when set, takes
//! precedence over the configured level.

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Build the log filter from `RUST_LOG` or the configured level
pub fn build_env_filter(level: &str) -> EnvFilter {
    match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::new(directives),
        _ => level_filter(level),
    }
}

fn level_filter(level: &str) -> EnvFilter {
    // Dependency chatter stays at warn unless asked for explicitly
    EnvFilter::new(format!("{},hyper=warn,reqwest=warn", level))
}

/// Install the global subscriber, plain text or JSON lines
pub fn init_logging(level: &str, json: bool) -> Result<(), SetGlobalDefaultError> {
    let filter = build_env_filter(level);

    if json {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
        tracing::subscriber::set_global_default(subscriber)
    }
}
