//! markr-server - Test results ingest and aggregate service
//!
//! Accepts scanned multiple-choice results as XML, keeps the best known score
//! per (test, student) pair and serves summary statistics per test.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use markr_common::config::{load_toml_config, locate_config_file, ConfigOverrides, ServerConfig};
use markr_common::db::{init_database, ResultStore};
use markr_server::{build_router, AppState};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Command-line arguments for markr-server
#[derive(Parser, Debug)]
#[command(name = "markr-server")]
#[command(about = "Test results ingest and aggregate service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "MARKR_PORT")]
    port: Option<u16>,

    /// Path to the SQLite database file
    #[arg(short, long, env = "MARKR_DATABASE")]
    database: Option<PathBuf>,

    /// Path to a TOML bootstrap config file
    #[arg(short, long, env = "MARKR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level used when RUST_LOG is not set
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let toml = match locate_config_file(args.config.as_deref())? {
        Some(path) => Some(load_toml_config(&path)?),
        None => None,
    };
    let config = ServerConfig::resolve(
        ConfigOverrides {
            port: args.port,
            database_path: args.database,
            log_level: args.log_level,
        },
        toml,
    );

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("{},tower_http=info", config.log_level))),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting markr-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;
    info!("✓ Database ready");

    let state = AppState::new(ResultStore::new(pool.clone()));
    let app = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
