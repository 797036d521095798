//! Service information endpoint.

use axum::Json;
use serde::Serialize;

/// Root endpoint payload.
#[derive(Debug, Serialize)]
pub struct ServiceInfo {
    pub message: &'static str,
    pub version: &'static str,
    pub health: &'static str,
}

/// `GET /` — API name, version, and where to find the health check.
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        message: "IFC Processor API",
        version: env!("CARGO_PKG_VERSION"),
        health: "/health",
    })
}
