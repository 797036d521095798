//! IFC upload and processing endpoint.
//!
//! `POST /upload-ifc` accepts a multipart form with one `file` field, stages
//! the payload under the configured upload folder, runs the full processing
//! pipeline on a blocking task, and always removes the staged file afterwards.

use std::path::Path;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, State},
};
use uuid::Uuid;

use crate::{
    AppState,
    error::AppError,
    models::response::ApiResponse,
    services::ifc_service::{self, ProcessReport},
};

/// Upload and process an IFC file in one request.
///
/// # Request
///
/// `multipart/form-data` with a single `file` field holding a `.ifc` file.
///
/// # Responses
///
/// - **200 OK**: full processing report (levels, elements, quantity table,
///   geometry, project info)
/// - **400**: no file field, or not a `.ifc` file
/// - **413**: payload exceeds the configured size limit
/// - **422**: the file is not parseable IFC
/// - **500**: staging or processing failure
pub async fn upload_and_process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<ProcessReport>>, AppError> {
    let (file_name, data) = read_file_field(&mut multipart).await?;

    if !is_allowed_file(&file_name) {
        return Err(AppError::UnsupportedFileType);
    }
    if data.len() > state.config.max_file_size {
        return Err(AppError::FileTooLarge {
            limit_mb: state.config.max_file_size_mb(),
        });
    }

    // Stage under a unique name so concurrent uploads of the same file
    // cannot collide.
    let upload_folder = Path::new(&state.config.upload_folder);
    tokio::fs::create_dir_all(upload_folder).await?;
    let temp_path = upload_folder.join(format!("temp_{}_{}", Uuid::new_v4(), basename(&file_name)));
    tokio::fs::write(&temp_path, &data).await?;

    tracing::info!(file = %file_name, "processing uploaded file");

    // Parsing and processing are CPU-bound; keep them off the async runtime.
    let worker_path = temp_path.clone();
    let result = tokio::task::spawn_blocking(move || ifc_service::process_file(&worker_path)).await;

    if let Err(err) = tokio::fs::remove_file(&temp_path).await {
        tracing::warn!(path = %temp_path.display(), error = %err, "failed to remove temporary file");
    }

    let report = result
        .map_err(|err| AppError::Internal(format!("processing task failed: {err}")))??;

    Ok(Json(ApiResponse::ok(
        format!("File {file_name} processed successfully"),
        report,
    )))
}

/// Pull the `file` field out of the multipart body.
async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Bytes), AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or(AppError::MissingFile)?;
        let data = field.bytes().await?;
        return Ok((file_name, data));
    }
    Err(AppError::MissingFile)
}

/// Check if file extension is allowed.
fn is_allowed_file(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("ifc"))
}

/// Strip any client-supplied path components from the file name.
fn basename(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
}
