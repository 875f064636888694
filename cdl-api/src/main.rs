//! cdl-api - CDL Jovem Vila Velha campaign service
//!
//! Imports contact spreadsheets into Supabase and sends bulk WhatsApp
//! messages through the Evolution API.

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cdl_api::config::{Cli, ServiceConfig};
use cdl_api::services::{EvolutionClient, SupabaseClient};
use cdl_api::AppState;

const CONFIG_ENV_VAR: &str = "CDL_CONFIG";
const CONFIG_FILE_NAME: &str = "cdl-api.toml";

/// Connect timeout for upstream HTTP calls (per-call limits come from the pipeline settings)
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let config_path = cdl_common::config::resolve_config_path(cli.config.as_deref(), CONFIG_ENV_VAR, CONFIG_FILE_NAME);
    let toml_config = cdl_common::config::load_toml_config(config_path.as_deref())?;

    // RUST_LOG overrides the configured level
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", toml_config.logging.level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting cdl-api (campaign service)");
    info!(
        "Version: {} (git {}, built {}, {})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &config_path {
        Some(path) => info!("Config file: {}", path.display()),
        None => info!("No config file found, using CLI/environment/defaults"),
    }

    let config = ServiceConfig::resolve(&cli, &toml_config)?;
    info!(
        "Pipeline: max_in_flight={}, call_timeout={}s",
        config.pipeline.concurrency(),
        config.pipeline.call_timeout_secs
    );

    let http = reqwest::Client::builder()
        .user_agent(concat!("cdl-api/", env!("CARGO_PKG_VERSION")))
        .connect_timeout(CONNECT_TIMEOUT)
        .build()
        .context("Failed to build HTTP client")?;

    let directory = Arc::new(SupabaseClient::new(http.clone(), &config.supabase));
    let gateway = Arc::new(EvolutionClient::new(http, &config.evolution));
    info!("Record store: {}", config.supabase.url);
    info!("WhatsApp gateway: {} (instance {})", config.evolution.url, config.evolution.instance);

    let shutdown = CancellationToken::new();
    let state = AppState::new(directory, gateway, config.pipeline, shutdown.clone());
    let app = cdl_api::build_router(state);

    let address = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind to {}", address))?;
    info!("Listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM, then cancel in-flight batches
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }

    shutdown.cancel();
}
