//! Rapport Router
//!
//! HTTP boundary for the friendship engine. Verifies the caller's bearer
//! token, maps each route onto one engine operation and reports the pair's
//! `friendship_status` back as JSON.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod handlers;
pub mod session;

use config::RouterConfig;
use handlers::{create_router, AppState};
use rapport_engine::FriendshipEngine;
use rapport_store::{SqliteStore, StoreError};
use session::SessionManager;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Router error
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Token issuing error
    #[error("Session error: {0}")]
    Session(#[from] session::SessionError),

    /// Bad command-line argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`, defaulting to `info`. Safe to call more than once.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build the application state from configuration
///
/// Opens (and if needed creates) the SQLite database.
pub fn build_state(config: &RouterConfig) -> Result<AppState, RouterError> {
    let store = SqliteStore::new(&config.database_path)?;

    Ok(AppState {
        session_manager: Arc::new(SessionManager::new(
            &config.jwt_secret,
            config.token_expiry_secs,
        )),
        engine: Arc::new(Mutex::new(FriendshipEngine::new(store))),
        login_path: config.login_path.clone(),
    })
}

/// Start the Router HTTP server
///
/// Opens the store, builds the routes and serves until the process exits.
pub async fn start_server(config: RouterConfig) -> Result<(), RouterError> {
    init_tracing();

    info!("Starting Rapport Router");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Token expiry: {} seconds", config.token_expiry_secs);

    let state = build_state(&config)?;
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Router listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| RouterError::Server(e.to_string()))?;

    Ok(())
}
