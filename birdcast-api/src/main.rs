//! birdcast-api - bird sighting prediction service
//!
//! Loads the presence, location and best-time model bundles (downloading
//! them into the cache on first run) and serves the prediction routes.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use birdcast_api::{build_router, model_store, AppState};
use birdcast_common::config::{CliOverrides, Settings, TomlConfig};

/// Command-line arguments
///
/// Each option may also be given through its environment variable
/// (`BIRDCAST_CONFIG`, `BIRDCAST_BIND`, `BIRDCAST_PORT`, `BIRDCAST_CACHE_DIR`).
#[derive(Parser, Debug)]
#[command(name = "birdcast-api", version, about = "Bird sighting prediction service")]
struct Args {
    /// Path to config.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Address to bind to
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// Directory holding cached model bundles
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // The log level lives in the config file, so read it before tracing is up
    let toml = TomlConfig::load(args.config.as_deref());
    let level = toml
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| birdcast_common::config::DEFAULT_LOG_LEVEL.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting Birdcast API (birdcast-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let toml = toml.context("Failed to load config file")?;
    let cli = CliOverrides {
        bind: args.bind,
        port: args.port,
        cache_dir: args.cache_dir,
    };
    let settings = Settings::resolve(cli, toml).context("Invalid configuration")?;
    info!("Model cache: {}", settings.cache_dir.display());
    for source in settings.sources() {
        match &source.url {
            Some(url) => info!("{} bundle: {} (from {})", source.name, source.path.display(), url),
            None => info!("{} bundle: {}", source.name, source.path.display()),
        }
    }

    let models = model_store::load_models(&settings)
        .await
        .context("Failed to load model bundles")?;
    info!("✓ Loaded presence, location and best-time models");

    let app = build_router(AppState::new(models));

    let addr = format!("{}:{}", settings.bind, settings.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("birdcast-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
