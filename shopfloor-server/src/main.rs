//! Shopfloor backend server.
//!
//! Entry point: configuration loading, database migrations, queue worker
//! startup, and the HTTP server. The worker is started explicitly here and
//! shut down after the HTTP server exits; nothing starts it lazily on first
//! use.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;

use shopfloor_machine::MockMachineAdapter;
use shopfloor_server::state::AppState;
use shopfloor_store::JobStore;
use shopfloor_worker::QueueWorker;

mod tracing_setup;

use tracing_setup::install_tracing_from_config;

#[derive(Debug, Parser)]
#[command(name = "shopfloor-server", about = "CNC job queue backend")]
struct CliArgs {
    /// Path to configuration file (overrides SHOPFLOOR_CONFIG_PATH)
    #[arg(short = 'c', long = "config-path")]
    config_path: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();

    // Resolve config path: CLI > environment variable
    let config_path = args
        .config_path
        .or_else(|| std::env::var("SHOPFLOOR_CONFIG_PATH").ok());

    let config = shopfloor_config::load_config(config_path.as_deref())?;
    shopfloor_config::validate_config(&config)?;

    install_tracing_from_config(&config.logging);

    // Create and migrate the database
    let mut db_cfg = shopfloor_db::DbPoolConfig::new(&config.database.url);
    db_cfg.max_connections = config.database.max_connections;
    let pool = shopfloor_db::create_pool(&db_cfg).await?;
    shopfloor_db::MIGRATOR.run(&pool).await?;
    tracing::info!(
        db_url = %config.database.url,
        db_max_connections = config.database.max_connections,
        "database ready"
    );

    let store = JobStore::new(pool);
    let state = Arc::new(AppState::new(store.clone()));

    // Start the queue worker explicitly, before accepting requests.
    let adapter = Arc::new(
        MockMachineAdapter::new()
            .with_name(&config.machine.name)
            .with_poll_interval(Duration::from_millis(config.machine.signal_poll_ms)),
    );
    let worker_handle = QueueWorker::new(store, adapter)
        .with_poll_interval(Duration::from_millis(config.worker.poll_interval_ms))
        .spawn();

    let app = shopfloor_server::build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Orderly stop: let a job mid-cut reach its outcome before exiting.
    tracing::info!("shutting down queue worker");
    worker_handle.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(%err, "failed to listen for shutdown signal");
    }
}
