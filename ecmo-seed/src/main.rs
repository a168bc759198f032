//! ecmo-seed - Rebuild the ECMO directory from CSV exports
//!
//! Wipes users, centers and auth rows, then re-imports both seed files.
//! Exits 0 when the run completes (even if individual rows were skipped)
//! and 1 when the database cannot be opened, a file cannot be read, or the
//! reset fails.

use anyhow::{Context, Result};
use clap::Parser;
use ecmo_common::config::{resolve_database_path, TomlConfig, DATABASE_ENV_VAR, DEFAULT_SEED_DATA_DIR};
use ecmo_common::db::init_database;
use ecmo_seed::importer::{import_from_files, ImportSummary};
use ecmo_seed::{CENTERS_FILE, TEAM_MEMBERS_FILE};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(version, about = "Seed the ECMO directory database from CSV exports", long_about = None)]
struct Args {
    /// SQLite database file (overrides config and ECMO_DATABASE)
    #[arg(short, long)]
    database: Option<String>,

    /// Configuration file (defaults to the platform config location)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Folder holding ecmo-centers.csv and ecmo-team-members.csv
    #[arg(short, long)]
    seed_dir: Option<PathBuf>,

    /// Centers export (overrides <seed_dir>/ecmo-centers.csv)
    #[arg(long)]
    centers: Option<PathBuf>,

    /// Team-members export (overrides <seed_dir>/ecmo-team-members.csv)
    #[arg(long)]
    team_members: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Config is read before tracing starts so log_level can apply
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

    info!("Starting ECMO directory seed (ecmo-seed) v{}", env!("CARGO_PKG_VERSION"));

    let result = match config_result {
        Ok((config, source)) => {
            source.log();
            run(args, config).await
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load configuration")),
    };

    match result {
        Ok(summary) => {
            info!("Seed completed successfully");
            info!("Summary:");
            info!("   - {} users created", summary.users_created);
            info!("   - {} centers created", summary.centers_created);
            info!("   - {} staff linked to centers", summary.members_linked);
            if summary.centers_skipped > 0 || summary.rows_failed > 0 {
                info!(
                    "   - {} centers skipped, {} rows failed",
                    summary.centers_skipped, summary.rows_failed
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Seed failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, config: TomlConfig) -> Result<ImportSummary> {
    let db_path = resolve_database_path(args.database.as_deref(), DATABASE_ENV_VAR, &config);
    info!("Database: {}", db_path.display());

    let seed_dir = args
        .seed_dir
        .or_else(|| config.seed_data_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_DATA_DIR));
    let centers_path = args.centers.unwrap_or_else(|| seed_dir.join(CENTERS_FILE));
    let team_members_path = args
        .team_members
        .unwrap_or_else(|| seed_dir.join(TEAM_MEMBERS_FILE));

    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let summary = import_from_files(&pool, &centers_path, &team_members_path)
        .await
        .context("Import aborted")?;

    pool.close().await;
    Ok(summary)
}
