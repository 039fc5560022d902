//! greenbite-est - dish emissions estimation service
//!
//! Loads the recipe and emissions datasets once at startup and serves
//! `POST /search`, `POST /emissions` and `GET /health`.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use greenbite_common::config::{self as common_config, ConfigOrigin, TomlConfig, CONFIG_ENV_VAR};
use greenbite_common::data::{load_recipe_table, load_reference_table};
use greenbite_est::config::{resolve_dataset_source, DatasetKind};
use greenbite_est::services::dataset_fetcher;
use greenbite_est::services::remote_scorer::RemoteScorer;
use greenbite_est::{build_router, AppState, Pipeline};

/// Command-line arguments for greenbite-est
#[derive(Parser, Debug)]
#[command(name = "greenbite-est")]
#[command(about = "Dish carbon-footprint estimation service")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = CONFIG_ENV_VAR)]
    config: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "GREENBITE_PORT")]
    port: Option<u16>,

    /// Address to bind (overrides config)
    #[arg(long, env = "GREENBITE_BIND")]
    bind: Option<String>,

    /// Recipe dataset, CSV or CSV.gz (overrides config)
    #[arg(long, env = "GREENBITE_RECIPES")]
    recipes: Option<PathBuf>,

    /// Emissions reference dataset, CSV or CSV.gz (overrides config)
    #[arg(long, env = "GREENBITE_EMISSIONS")]
    emissions: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // clap already merged the env var into `args.config`
    let config_path = common_config::resolve_config_path(args.config.as_deref(), CONFIG_ENV_VAR);
    let config = match &config_path {
        Some(path) => common_config::load_toml_config(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => TomlConfig::default(),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("greenbite_est={0},greenbite_common={0},tower_http=info", config.logging.level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting greenbite-est v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    ConfigOrigin::of(config_path.as_deref()).log();

    let emissions_source =
        resolve_dataset_source(DatasetKind::Emissions, args.emissions.as_deref(), &config);
    let recipes_source =
        resolve_dataset_source(DatasetKind::Recipes, args.recipes.as_deref(), &config);

    // Missing datasets degrade the service rather than stopping it
    let reference = match dataset_fetcher::fetch(&emissions_source).await {
        Ok(path) => tokio::task::spawn_blocking(move || load_reference_table(&path))
            .await
            .context("Emissions loader task failed")?
            .map_err(|e| error!("Emissions dataset unavailable: {}", e))
            .ok(),
        Err(e) => {
            error!("Emissions dataset unavailable ({}): {}", emissions_source.describe(), e);
            None
        }
    };
    let recipes = match dataset_fetcher::fetch(&recipes_source).await {
        Ok(path) => tokio::task::spawn_blocking(move || load_recipe_table(&path))
            .await
            .context("Recipe loader task failed")?
            .map_err(|e| error!("Recipe dataset unavailable: {}", e))
            .ok(),
        Err(e) => {
            error!("Recipe dataset unavailable ({}): {}", recipes_source.describe(), e);
            None
        }
    };

    let pipeline = Pipeline::new(
        reference.map(Arc::new),
        recipes.map(Arc::new),
        config.matching,
        config.scoring.policy,
    );
    info!(
        "Matching: ingredient_threshold={} dish_threshold={} recipe_limit={} metric={:?} scoring={:?}",
        config.matching.ingredient_threshold,
        config.matching.dish_threshold,
        config.matching.recipe_limit,
        config.matching.metric,
        config.scoring.policy
    );
    if !pipeline.dataset_status().all_loaded() {
        warn!("Running degraded: at least one dataset failed to load");
    }

    let mut state = AppState::new(pipeline);
    if let Some(url) = config.scoring.remote_url.as_deref().filter(|u| !u.trim().is_empty()) {
        let timeout = Duration::from_secs(config.scoring.remote_timeout_secs);
        state = state.with_remote_scorer(RemoteScorer::new(url, timeout)?);
        info!("Remote scorer: {}", url);
    }

    let app = build_router(state);

    let bind = args.bind.unwrap_or(config.bind_addr);
    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("Listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
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
                error!("Failed to install SIGTERM handler: {}", e);
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
}
