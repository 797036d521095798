//! Error types and HTTP error response handling.
//!
//! This module defines all application errors and how they are converted
//! into HTTP responses with appropriate status codes and JSON bodies.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::ifc::IfcError;

/// Application-wide error type.
///
/// Each variant maps to a specific HTTP status code and error message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The multipart request carried no `file` field.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("No file selected")]
    MissingFile,

    /// The uploaded file does not have an `.ifc` extension.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid file type. Only .ifc files are allowed")]
    UnsupportedFileType,

    /// The uploaded file exceeds the configured size limit.
    ///
    /// Returns HTTP 413 Payload Too Large.
    #[error("File too large. Maximum size is {limit_mb}MB")]
    FileTooLarge { limit_mb: usize },

    /// The multipart body could not be read.
    ///
    /// Returns HTTP 400 Bad Request.
    #[error("Invalid upload: {0}")]
    Multipart(#[from] axum::extract::multipart::MultipartError),

    /// The file could not be read or parsed as IFC.
    ///
    /// Parse failures return HTTP 422 Unprocessable Entity; I/O failures
    /// while reading the staged file return HTTP 500.
    #[error(transparent)]
    Ifc(#[from] IfcError),

    /// Filesystem error while staging the upload.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Unexpected failure, e.g. a cancelled processing task.
    ///
    /// Returns HTTP 500 Internal Server Error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Convert AppError into an HTTP response.
///
/// All errors return JSON in this format:
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": "error_type",
///     "message": "Human-readable error message"
///   }
/// }
/// ```
///
/// Internal errors are logged and their details hidden from the client.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map each error variant to (HTTP status, error code, message)
        let (status, code, message) = match self {
            AppError::MissingFile => (StatusCode::BAD_REQUEST, "missing_file", self.to_string()),
            AppError::UnsupportedFileType => (
                StatusCode::BAD_REQUEST,
                "invalid_file_type",
                self.to_string(),
            ),
            AppError::FileTooLarge { .. } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                self.to_string(),
            ),
            // A body that blows through the transport limit surfaces as a
            // multipart read error with a 413 status; keep that status so
            // oversized uploads are reported consistently.
            AppError::Multipart(ref err) if err.status() == StatusCode::PAYLOAD_TOO_LARGE => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "file_too_large",
                err.to_string(),
            ),
            AppError::Multipart(ref err) => {
                (StatusCode::BAD_REQUEST, "invalid_upload", err.to_string())
            }
            AppError::Ifc(IfcError::Parse(ref err)) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_ifc",
                format!("invalid IFC file: {err}"),
            ),
            AppError::Ifc(IfcError::Io(_)) | AppError::Io(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "success": false,
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ifc::ParseError;

    #[test]
    fn maps_client_errors_to_4xx() {
        assert_eq!(
            AppError::MissingFile.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::UnsupportedFileType.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::FileTooLarge { limit_mb: 100 }.into_response().status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            AppError::Ifc(IfcError::Parse(ParseError::NotStep))
                .into_response()
                .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn hides_internal_error_details() {
        let response =
            AppError::Internal("worker thread panicked".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn file_too_large_message_names_the_limit() {
        let message = AppError::FileTooLarge { limit_mb: 100 }.to_string();
        assert_eq!(message, "File too large. Maximum size is 100MB");
    }
}
