//! Application setup and initialization
//!
//! Initialization logic lives here rather than in main.rs so tests can build
//! the same router against their own state.

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use std::sync::Arc;
use vidvault_core::Config;
use vidvault_storage::create_storage;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Validate configuration first - fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    crate::telemetry::init_telemetry();

    tracing::info!("Configuration loaded and validated successfully");

    let storage = create_storage(&config)
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        bucket = %storage.bucket(),
        "Storage backend initialized"
    );

    let state = Arc::new(AppState::new(config.clone(), storage));
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
