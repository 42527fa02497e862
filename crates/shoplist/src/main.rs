//! Shoplist - personal inventory lists behind token authentication

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use crate::config::{Config, LogFormat};
use shoplist_api::{AppState, create_router};
use shoplist_auth::JwtManager;
use shoplist_db::Database;

/// Shoplist - multi-tenant shopping list service
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "SHOPLIST_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "SHOPLIST_PORT")]
    port: Option<u16>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Give items stored without an owner to the earliest registered user
    AssignOrphans,
    /// Connect to the database and print row counts
    CheckDb,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config)?;

    init_logging(&config.logging.level, config.logging.format);

    info!("Starting Shoplist v{}", env!("CARGO_PKG_VERSION"));

    if let Some(dir) = config.database_dir() {
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("Failed to create data directory {}", dir.display()))?;
    }

    let db = Database::new(&config.database_options())
        .await
        .context("Failed to open database")?;

    let result = match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&args, &config, db.clone()).await,
        Command::AssignOrphans => assign_orphans(&db).await,
        Command::CheckDb => check_db(&db).await,
    };

    db.close().await;
    result
}

/// Run the HTTP server until a shutdown signal arrives
async fn serve(args: &Args, config: &Config, db: Database) -> Result<()> {
    if config.uses_default_secret() {
        warn!("auth.secret_key is the built-in default; set SHOPLIST__AUTH__SECRET_KEY in production");
    }

    let jwt = Arc::new(JwtManager::new(&config.auth.secret_key, config.token_ttl()));

    let metrics_handle = if config.metrics.enabled {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("Failed to install metrics recorder")?;
        Some(Arc::new(handle))
    } else {
        None
    };

    let state = AppState::new(db, jwt);
    let app = create_router(state, metrics_handle);

    let bind_addr = args.bind.clone().unwrap_or_else(|| config.server.bind_address.clone());
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind_addr, port))?;

    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Assign ownerless items to the earliest registered user
async fn assign_orphans(db: &Database) -> Result<()> {
    let counts = db.table_counts().await?;
    if counts.orphan_items == 0 {
        info!("No items without an owner");
        return Ok(());
    }

    let Some(owner) = db.get_first_user().await? else {
        warn!(
            "{} items have no owner but there are no users to assign them to",
            counts.orphan_items
        );
        return Ok(());
    };

    let assigned = db.assign_orphan_items(&owner.username).await?;
    let skipped = counts.orphan_items.saturating_sub(assigned as i64);

    info!("Assigned {} items to {}", assigned, owner.username);
    if skipped > 0 {
        warn!(
            "{} items kept no owner because {} already has items with the same name",
            skipped, owner.username
        );
    }
    println!("Assigned {} items to {}", assigned, owner.username);
    Ok(())
}

/// Ping the database and report table sizes
async fn check_db(db: &Database) -> Result<()> {
    db.ping().await.context("Database ping failed")?;
    let counts = db.table_counts().await?;

    info!("Database is reachable");
    println!("users: {}", counts.users);
    println!("items: {}", counts.items);
    println!("items without owner: {}", counts.orphan_items);
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_serve() {
        let args = Args::try_parse_from(["shoplist"]).unwrap();
        assert_eq!(args.command.unwrap_or(Command::Serve), Command::Serve);
        assert_eq!(args.config, "config/default.toml");
    }

    #[test]
    fn test_maintenance_subcommands() {
        let args = Args::try_parse_from(["shoplist", "assign-orphans"]).unwrap();
        assert_eq!(args.command, Some(Command::AssignOrphans));

        let args = Args::try_parse_from(["shoplist", "--config", "x.toml", "check-db"]).unwrap();
        assert_eq!(args.command, Some(Command::CheckDb));
        assert_eq!(args.config, "x.toml");
    }
}
