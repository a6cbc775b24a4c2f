//! HTTP layer - JSON API routes, server-rendered pages and shared request context
//!
//! This module provides the web interface for the expense manager. Handlers
//! receive everything they need explicitly: the [`AppState`] through axum's
//! `State` extractor and the signed-in user through the session extractors.

/// JSON API routes built on the generic resource handlers
pub mod api;
/// Error responses for the JSON API
pub mod error;
/// Server-rendered HTML pages
pub mod pages;
/// Session cookie handling and user extractors
pub mod session;


use crate::{config::settings::Settings, errors::Result};
use axum::{Router, routing::get};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Shared data available to all handlers.
/// This structure holds the database connection and the immutable settings.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded at start-up
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Creates a new `AppState` from a connection and settings.
    #[must_use]
    pub fn new(database: DatabaseConnection, settings: Settings) -> Self {
        Self {
            database,
            settings: Arc::new(settings),
        }
    }
}

/// Builds the complete application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(api::routes())
        .merge(pages::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds the configured address and serves until Ctrl-C.
pub async fn run_server(state: AppState) -> Result<()> {
    let address = state.settings.server.bind_address.clone();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!("Server listening on http://{address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
