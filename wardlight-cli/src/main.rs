// Wardlight CLI - runs the signaling board and maintains its database

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use wardlight_web::WebConfig;

#[derive(Parser, Debug)]
#[command(name = "wardlight")]
#[command(about = "Ward signaling board for imaging modalities and departments", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "WARDLIGHT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Start the web server (default)
    Web,

    /// Execute the statements of a SQL script against the database
    DbExec {
        /// Path of the SQL script
        #[arg(long)]
        script_path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("wardlight=info".parse()?)
                .add_directive("wardlight_core=info".parse()?)
                .add_directive("wardlight_web=info".parse()?),
        )
        .init();

    let config = WebConfig::load(cli.config.as_deref()).map_err(|e| {
        error!("Failed to load configuration: {:#}", e);
        e
    })?;

    match cli.command.unwrap_or(Commands::Web) {
        Commands::Web => wardlight_web::serve(config).await,
        Commands::DbExec { script_path } => db_exec(&config, &script_path).await,
    }
}

async fn db_exec(config: &WebConfig, script_path: &Path) -> Result<()> {
    let sql = std::fs::read_to_string(script_path)
        .with_context(|| format!("could not read script {}", script_path.display()))?;

    let database_path = config.database_path();
    info!(
        "Executing {} against {}",
        script_path.display(),
        database_path.display()
    );

    let pool = wardlight_core::initialize_database(&database_path).await?;
    let affected = wardlight_core::execute_script(&pool, &sql).await?;

    for (index, rows) in affected.iter().enumerate() {
        info!("Statement {}: {} rows affected", index + 1, rows);
    }
    info!("Executed {} statements", affected.len());

    pool.close().await;
    Ok(())
}
