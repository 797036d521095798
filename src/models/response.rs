//! API response envelope shared by all endpoints.

use serde::Serialize;

/// Uniform success envelope.
///
/// All fields are always serialized, with `null` standing in for absent
/// values, so clients can rely on a stable shape:
///
/// ```json
/// {
///   "success": true,
///   "message": "File demo.ifc processed successfully",
///   "data": { ... },
///   "error": null
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            data: Some(data),
            error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_keeps_null_error_field() {
        let json = serde_json::to_value(ApiResponse::ok("done", 42)).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "done");
        assert_eq!(json["data"], 42);
        assert!(json["error"].is_null());
    }
}
