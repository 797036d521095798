//! IFC Processor API.
//!
//! A REST API for processing IFC building models into 3D bounding-box
//! geometry and quantity take-off tables. The library crate exposes the
//! router so both the binary and the integration tests can build the app.

pub mod config;
pub mod error;
pub mod handlers;
pub mod ifc;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    trace::TraceLayer,
};

use config::Config;

/// Shared application state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<Config>,
}

/// Build the HTTP router.
pub fn app(config: Config) -> Router {
    // Leave headroom above the file limit for multipart framing; the exact
    // file size check happens in the upload handler.
    let body_limit = config.max_file_size + 64 * 1024;
    let cors = cors_layer(&config);
    let state = AppState {
        config: Arc::new(config),
    };

    Router::new()
        .route("/", get(handlers::info::service_info))
        .route("/health", get(handlers::health::health_check))
        .route("/upload-ifc", post(handlers::upload::upload_and_process))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the browser frontend: configured origins with credentials,
/// mirroring whatever methods and headers the preflight asks for.
fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}
