//! scour server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use scour_core::config::AppConfig;
use scour_server::{AppState, create_router};
use std::net::SocketAddr;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// scour - user storage purge service
#[derive(Parser, Debug)]
#[command(name = "scourd")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(
        short,
        long,
        env = "SCOUR_CONFIG",
        default_value = "config/server.toml"
    )]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Startup banner
    tracing::info!("scour v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    // Check for SCOUR_ environment variables (excluding SCOUR_CONFIG which is just the path)
    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("SCOUR_") && key != "SCOUR_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: scourd --config /path/to/config.toml\n  \
             2. Environment variables: SCOUR_SERVER__BIND=0.0.0.0:8080 \
             SCOUR_ADMIN__TOKEN_HASH=YOUR_TOKEN_HASH_HERE scourd\n\n\
             Set SCOUR_CONFIG to specify a default config file path."
        );
    }

    if !has_config_file {
        tracing::info!("Using environment variables for configuration");
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("SCOUR_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Register Prometheus metrics
    scour_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // Initialize files backend
    let files = scour_files::from_config(&config.files)
        .await
        .context("failed to initialize files backend")?;

    // Verify the files tree before accepting requests. This catches
    // misconfiguration (e.g. a missing data directory mount) early instead
    // of failing inside the first purge.
    files
        .health_check()
        .await
        .context("files backend health check failed")?;
    tracing::info!("Files backend initialized");

    // Initialize metadata store
    let metadata = scour_metadata::from_config(&config.metadata)
        .await
        .context("failed to initialize metadata store")?;
    metadata
        .health_check()
        .await
        .context("metadata store health check failed")?;
    tracing::info!("Metadata store initialized");

    // Create application state and router
    let state = AppState::new(config.clone(), files, metadata);
    let app = create_router(state);

    // Parse bind address
    let addr: SocketAddr = config.server.bind.parse().context("invalid bind address")?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
