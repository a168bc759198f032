//! ecmo-directory - JSON service over the ECMO directory database
//!
//! Serves user and center CRUD plus a health endpoint. Bind address
//! resolves CLI > config `bind_address` > 127.0.0.1:5730.

use anyhow::{Context, Result};
use clap::Parser;
use ecmo_common::config::{resolve_database_path, TomlConfig, DATABASE_ENV_VAR, DEFAULT_BIND_ADDRESS};
use ecmo_common::db::init_database;
use ecmo_directory::{build_router, AppState};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about = "Serve the ECMO directory over HTTP", long_about = None)]
struct Args {
    /// SQLite database file (overrides config and ECMO_DATABASE)
    #[arg(short, long)]
    database: Option<String>,

    /// Configuration file (defaults to the platform config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:5730
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_result = TomlConfig::load_with_source(args.config.as_deref());
    let directive = config_result
        .as_ref()
        .map(|(c, _)| c.log_directive().to_string())
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive)),
        )
        .init();

    info!("Starting ECMO Directory (ecmo-directory) v{}", env!("CARGO_PKG_VERSION"));

    let (config, source) = config_result.context("Failed to load configuration")?;
    source.log();

    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_ENV_VAR, &config);
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Connected to database");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::new(pool);
    let app = build_router(state);

    let bind = args
        .bind
        .or(config.bind_address)
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;
    info!("ecmo-directory listening on http://{}", bind);
    info!("Health check: http://{}/health", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
