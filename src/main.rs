//! rinkside-gateway server entry point.
//!
//! Starts the Axum HTTP server with REST and WebSocket endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use rinkside_gateway::api;
use rinkside_gateway::app_state::AppState;
use rinkside_gateway::config::{GatewayConfig, StoreBackend};
use rinkside_gateway::service::{EventIngestionPipeline, LoggingStandingsTrigger};
use rinkside_gateway::store::{
    EventStore, MemoryEventStore, MemoryProjectionStore, PostgresEventStore,
    PostgresProjectionStore, ProjectionStore,
};
use rinkside_gateway::ws::{BroadcastEngine, ConnectionRegistry};
use rinkside_gateway::ws::handler::ws_attach_handler;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = GatewayConfig::from_env()?;
    tracing::info!(addr = %config.listen_addr, "starting rinkside-gateway");

    // Build the storage layer
    let (events, projections): (Arc<dyn EventStore>, Arc<dyn ProjectionStore>) =
        match config.store_backend {
            StoreBackend::Postgres => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.database_max_connections)
                    .min_connections(config.database_min_connections)
                    .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
                    .connect(&config.database_url)
                    .await?;

                if config.run_migrations {
                    sqlx::migrate!("./migrations").run(&pool).await?;
                    tracing::info!("migrations applied");
                }

                (
                    Arc::new(PostgresEventStore::new(pool.clone())),
                    Arc::new(PostgresProjectionStore::new(pool)),
                )
            }
            StoreBackend::Memory => {
                tracing::warn!("using in-memory stores, data will not survive a restart");
                (
                    Arc::new(MemoryEventStore::new()),
                    Arc::new(MemoryProjectionStore::new()),
                )
            }
        };

    // Build the broadcast and service layers
    let registry = Arc::new(ConnectionRegistry::new());
    let broadcaster = BroadcastEngine::new(Arc::clone(&registry));
    let standings = Arc::new(LoggingStandingsTrigger);
    let pipeline = Arc::new(EventIngestionPipeline::new(
        events,
        projections,
        standings,
        broadcaster,
    ));

    // Build application state
    let app_state = AppState { pipeline, registry };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .route("/ws/games/{game_id}", get(ws_attach_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
