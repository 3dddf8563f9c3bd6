use std::net::SocketAddr;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use rewaste_server::config::AppConfig;
use rewaste_server::database;
use rewaste_server::state::AppState;

#[derive(Debug, Parser)]
#[command(version, about = "ReWaste handicraft and activity API")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Sync the schema and serve HTTP (default).
    Serve,
    /// Create missing tables and columns, then exit.
    Migrate,
    /// Drop every table and recreate it empty.
    Reset {
        /// Confirm that all data should be deleted.
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_max_level(config.mode.log_level())
        .init();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Migrate => {
            let db = database::init_db(&config.database).await?;
            db.close().await?;
            Ok(())
        }
        Command::Reset { yes } => {
            confirm_reset(yes)?;
            let db = database::connect(&config.database).await?;
            database::reset_schema(&db).await?;
            db.close().await?;
            Ok(())
        }
    }
}

fn confirm_reset(yes: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("Refusing to drop all tables without --yes");
    }
    Ok(())
}

async fn serve(config: AppConfig) -> anyhow::Result<()> {
    let db = database::init_db(&config.database)
        .await
        .context("Failed to initialize database")?;
    let store = common::storage::from_config(&config.storage)
        .context("Failed to initialize object storage")?;
    info!(bucket = store.bucket(), backend = ?config.storage.backend, "Object storage ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db: db.clone(),
        store,
        config,
    };
    let app = rewaste_server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Shutting down");
    db.close().await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
