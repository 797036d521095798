//! Health check endpoint for service monitoring.

use crate::{AppState, error::AppError, models::response::ApiResponse};
use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthData {
    /// Overall service status
    pub status: String,

    /// Absolute path of the upload staging folder
    pub upload_folder: String,

    /// Current server timestamp
    pub timestamp: DateTime<Utc>,
}

/// Health check handler.
///
/// # Response (200 OK)
///
/// ```json
/// {
///   "success": true,
///   "message": "IFC Processor API is running",
///   "data": {
///     "status": "healthy",
///     "upload_folder": "/srv/ifc/uploads",
///     "timestamp": "2025-12-21T19:00:00Z"
///   },
///   "error": null
/// }
/// ```
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<HealthData>>, AppError> {
    let upload_folder = std::path::absolute(&state.config.upload_folder)
        .map(|path| path.display().to_string())
        .unwrap_or_else(|_| state.config.upload_folder.clone());

    Ok(Json(ApiResponse::ok(
        "IFC Processor API is running",
        HealthData {
            status: "healthy".to_string(),
            upload_folder,
            timestamp: Utc::now(),
        },
    )))
}
