use std::net::SocketAddr;

use axum::{Router, routing::get};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::{
    services::{create_ledger, get_ledger, health, list_ledgers, metrics},
    state::AppState,
};
use crate::config::Config;
use crate::provider::LedgerProvider;

type AnyError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Routes served by the ledger server
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ledgers", get(list_ledgers).post(create_ledger))
        .route("/ledgers/{ledger_id}", get(get_ledger))
        .route("/operators/metrics", get(metrics))
        .route("/health", get(health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Run the server until Ctrl+C / SIGTERM
///
/// The provider, and with it the storage root lock, is held for the whole
/// run and released on shutdown.
pub async fn run(config: Config, address: Option<SocketAddr>) -> Result<(), AnyError> {
    info!(root = %config.ledger.root_fs_path.display(), "Opening ledger provider");
    let provider = LedgerProvider::open(&config.ledger)?;

    let address = address.unwrap_or(config.server.bind_addr);
    let app = router(AppState::new(provider));

    let listener = TcpListener::bind(address).await?;
    info!(%address, "Ledger server listening");

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Ledger server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
