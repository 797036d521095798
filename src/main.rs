//! IFC Processor API - Main Application Entry Point
//!
//! This is a REST API server for processing IFC building models. It accepts
//! IFC file uploads and returns building levels, element records, a quantity
//! take-off table, and simplified 3D geometry in one response.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **IFC Reading**: built-in ISO 10303-21 parser (no external kernel)
//! - **Format**: multipart upload, JSON responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create the upload staging folder
//! 3. Build HTTP router with routes and middleware
//! 4. Start server on configured port

use ifc_processor_api::{app, config::Config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    // Create upload directory
    tokio::fs::create_dir_all(&config.upload_folder).await?;
    tracing::info!(folder = %config.upload_folder, "Upload folder ready");

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let router = app(config);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    // This blocks forever, handling requests concurrently with tokio
    axum::serve(listener, router).await?;

    Ok(())
}
