//! ewallet API server.
//!
//! Main entry point for the wallet ledger service.

use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ewallet_api::{AppState, create_router};
use ewallet_core::auth::ClientSecretStore;
use ewallet_core::ledger::LedgerRepository;
use ewallet_db::{ClientRepository, PgLedgerRepository, connect};
use ewallet_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ewallet=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;

    let db = connect(&config.database).await?;
    info!(
        max_connections = config.database.max_connections,
        "Connected to database"
    );

    let ledger: Arc<dyn LedgerRepository> = Arc::new(PgLedgerRepository::new(db.clone()));
    let clients: Arc<dyn ClientSecretStore> = Arc::new(ClientRepository::new(db));
    let state = AppState::new(ledger, clients, config.ledger.top_up_retry_budget());

    let app = create_router(state, config.server.request_timeout());

    let addr = config.server.address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
