use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use roster::{infra::hashing::Argon2CredentialHasher, Roster, RosterConfig};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use std::path::{Path, PathBuf};

mod db;
mod request_id;
mod shutdown;
mod web;

const MODULE_NAME: &str = "roster";

/// Roster Server - groups and their members over HTTP
#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Roster Server - groups and their members over HTTP")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir is normalized inside
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if args.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::info!("Roster Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn database_config(config: &AppConfig) -> DatabaseConfig {
    config.database.clone().unwrap_or_else(|| {
        tracing::warn!("No database configuration found, using the default SQLite file");
        DatabaseConfig::default()
    })
}

async fn run_server(config: AppConfig) -> Result<()> {
    let roster_cfg: RosterConfig = config.module_config(MODULE_NAME)?;
    let home_dir = PathBuf::from(&config.server.home_dir);

    let db = db::connect(&database_config(&config), &home_dir).await?;
    let roster = Roster::init(db, &roster_cfg).await?;
    let router = web::build_router(&roster, &config.server);

    let bind = (config.server.host.as_str(), config.server.port);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind.0, bind.1))?;
    tracing::info!("HTTP server bound on {}", listener.local_addr()?);

    let shutdown = async {
        if let Err(e) = shutdown::wait_for_shutdown().await {
            tracing::warn!("Signal handler failed ({e}); falling back to ctrl_c()");
            let _ = tokio::signal::ctrl_c().await;
        }
        tracing::info!("HTTP server shutting down gracefully");
    };

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server failed")?;

    tracing::info!("Roster Server stopped");
    Ok(())
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    let roster_cfg: RosterConfig = config.module_config(MODULE_NAME)?;
    Argon2CredentialHasher::from_config(&roster_cfg.hashing)
        .context("Invalid modules.roster.hashing settings")?;

    let db_cfg = database_config(config);
    let backend = db::detect_backend(&db_cfg.url)?;
    db_cfg.resolved_url(Path::new(&config.server.home_dir), false)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed (database backend: {backend:?})");
    println!("{}", config.to_yaml()?);

    Ok(())
}
