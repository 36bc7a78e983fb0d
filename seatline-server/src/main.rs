//! Seatline Server
//!
//! Capacity-limited event registration with ticket codes.

mod api;
mod config;
mod server;
mod shutdown;
mod state;

use clap::Parser;
use config::{ConfigLoader, get_database_url};
use seatline_core::events::{NotificationPublisher, notification_event_channel};
use seatline_core::notify::notifier_from_config;
use seatline_core::processors::{Janitor, NotificationSender};
use seatline_core::store::{EventStore, MemoryStore, PostgresStore};
use server::{build_router, run_server};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use state::AppState;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Seatline - event registration service
#[derive(Parser, Debug)]
#[command(name = "seatline-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the configuration file
    #[arg(short, long, default_value = "./seatline.toml")]
    config: PathBuf,

    /// Override the listen address (e.g., 0.0.0.0:3000)
    #[arg(short, long)]
    listen: Option<SocketAddr>,

    /// Run database migrations on startup
    #[arg(long, default_value = "false")]
    migrate: bool,

    /// Emit logs as JSON lines
    #[arg(long, env = "SEATLINE_LOG_JSON", default_value = "false")]
    log_json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize tracing
    init_tracing(args.log_json);

    tracing::info!("Starting seatline-server v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = ConfigLoader::new(&args.config, args.listen)
        .load()
        .map_err(|e| {
            tracing::error!("Failed to load configuration: {}", e);
            e
        })?;
    tracing::info!("Configuration loaded from {:?}", args.config);

    let (store, db_pool) = connect_store(args.migrate).await?;

    for event in &config.events {
        store.upsert_event(event.clone()).await.map_err(|e| {
            tracing::error!(event_id = %event.id, "Failed to seed event: {}", e);
            e
        })?;
    }
    tracing::info!("Seeded {} events", config.events.len());

    // Background processors
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (event_tx, event_rx) = notification_event_channel();
    let publisher = NotificationPublisher::new(event_tx);

    let state = AppState::new(
        store,
        &config.cache,
        config.rate_limit_policy(),
        Some(publisher),
    );

    let notification_sender = NotificationSender::new(
        notifier_from_config(&config.notifications),
        config.notifications.clone(),
        event_rx,
        shutdown_rx.clone(),
    );
    let janitor = Janitor::new(
        state.catalog.cache().clone(),
        state.limiter.clone(),
        config.cache.sweep_interval,
        shutdown_rx,
    );
    let sender_handle = tokio::spawn(notification_sender.run());
    let janitor_handle = tokio::spawn(janitor.run());

    // Build the router
    let router = build_router(state);

    // Run the server
    let listen_addr = config.server.listen;
    tracing::info!("Starting HTTP server on {}", listen_addr);
    let result = run_server(router, listen_addr).await;

    // Stop background processors
    let _ = shutdown_tx.send(true);
    for (name, handle) in [("notification sender", sender_handle), ("janitor", janitor_handle)] {
        if let Err(e) = handle.await {
            tracing::error!("Background processor {} panicked: {}", name, e);
        }
    }

    // Close database connections gracefully
    if let Some(db_pool) = db_pool {
        tracing::info!("Closing database connections...");
        db_pool.close().await;
    }
    tracing::info!("Server shutdown complete");

    result.map_err(Into::into)
}

/// Postgres when `DATABASE_URL` is set, the in-memory store otherwise.
async fn connect_store(migrate: bool) -> anyhow::Result<(Arc<dyn EventStore>, Option<PgPool>)> {
    let Some(database_url) = get_database_url() else {
        tracing::warn!("DATABASE_URL not set, using the in-memory store; data will not persist");
        return Ok((Arc::new(MemoryStore::new()), None));
    };

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .map_err(|e| {
            tracing::error!("Failed to connect to database: {}", e);
            e
        })?;
    tracing::info!("Database connection established");

    // Run migrations if requested
    if migrate {
        tracing::info!("Running database migrations...");
        sqlx::migrate!("../migrations")
            .run(&db_pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to run migrations: {}", e);
                e
            })?;
        tracing::info!("Migrations completed successfully");
    }

    Ok((Arc::new(PostgresStore::new(db_pool.clone())), Some(db_pool)))
}

/// Initialize the tracing subscriber with environment-based filtering.
fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}
