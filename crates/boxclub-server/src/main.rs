//! BoxClub storefront server
//!
//! Usage:
//! ```bash
//! # Built-in tenants, backend at http://localhost:3001/api
//! boxclub-server
//!
//! # With a config file and extra tenant definitions
//! boxclub-server --config boxclub.yaml --tenants-dir ./tenants
//!
//! # Check tenant definitions without starting the server
//! boxclub-server validate --tenants-dir ./tenants
//! ```
//!
//! Test with:
//! ```bash
//! curl -H 'Host: brewjaria.com.br' http://localhost:3000/api/tenant
//! curl http://localhost:3000/t/grao-mestre
//! ```

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use boxclub_observability::{Metrics, init_logging};
use boxclub_server::{ServerConfig, build_state, load_registry, router};

/// BoxClub Server - multi-tenant subscription storefront
#[derive(Parser)]
#[command(name = "boxclub-server")]
#[command(about = "Multi-tenant storefront server for subscription clubs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Path to configuration file (YAML or TOML)
    #[arg(
        short,
        long,
        value_name = "FILE",
        env = "BOXCLUB_CONFIG",
        global = true
    )]
    config: Option<String>,

    /// Address to bind
    #[arg(long, global = true)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, global = true)]
    port: Option<u16>,

    /// Backend API base URL
    #[arg(long, value_name = "URL", global = true)]
    api_url: Option<String>,

    /// Directory of tenant definition files
    #[arg(long, value_name = "DIR", global = true)]
    tenants_dir: Option<String>,

    /// Slug of the tenant served to local hosts and unresolved requests
    #[arg(long, value_name = "SLUG", global = true)]
    default_tenant: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server (default if no command specified)
    Serve,
    /// Load tenant definitions, report them and exit
    Validate,
}

impl Cli {
    /// CLI flags take precedence over file and environment
    fn apply_overrides(&self, config: &mut ServerConfig) {
        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(url) = &self.api_url {
            config.api.url = url.clone();
        }
        if let Some(dir) = &self.tenants_dir {
            config.tenants.directory = Some(dir.clone());
        }
        if let Some(slug) = &self.default_tenant {
            config.tenants.default_slug = slug.clone();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    config.merge_env();
    cli.apply_overrides(&mut config);
    config.validate()?;

    init_logging(&config.logging.level, config.logging.json)?;
    match &cli.config {
        Some(path) => info!("Loaded configuration from {}", path),
        None => info!("Using default configuration"),
    }

    if let Some(Commands::Validate) = cli.command {
        return validate(&config);
    }

    let metrics = Arc::new(Metrics::new()?);
    let state = build_state(&config, metrics)?;
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!("BoxClub server listening on http://{}", addr);
    info!("  GET  /api/tenant              resolved tenant");
    info!("  GET  /api/tenant/theme.css    theme variables");
    info!("  GET  /api/metadata            page metadata");
    info!("  GET  /t/{{slug}}                storefront");
    info!("  GET  /api/backend/{{*path}}     tenant-scoped backend proxy");
    info!("  GET  /healthz /readyz /metrics");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

fn validate(config: &ServerConfig) -> anyhow::Result<()> {
    let registry = load_registry(config)?;
    if !registry.contains(&config.tenants.default_slug) {
        anyhow::bail!(
            "default tenant '{}' is not among the {} loaded tenants",
            config.tenants.default_slug,
            registry.len()
        );
    }

    for slug in registry.slugs() {
        if let Some(tenant) = registry.get_by_slug(slug) {
            let domains = if tenant.domains.is_empty() {
                "-".to_string()
            } else {
                tenant.domains.join(", ")
            };
            println!(
                "{:<24} {:<28} theme={:<12} plans={} domains={}",
                tenant.slug,
                tenant.name,
                tenant.theme_slug,
                tenant.plans.len(),
                domains
            );
        }
    }
    println!("{} tenants OK", registry.len());
    Ok(())
}

/// Wait for shutdown signal (SIGINT or SIGTERM)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
