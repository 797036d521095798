use std::path::Path;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, StatusCode, header};
use http_body_util::BodyExt;
use ifc_processor_api::{app, config::Config};
use tower::ServiceExt;

pub const MULTIPART_BOUNDARY: &str = "X-BOUNDARY";

/// Build a test `Config` with safe defaults.
///
/// The upload folder points at a caller-provided temporary directory so
/// tests never touch the real staging area.
pub fn test_config(upload_folder: &Path) -> Config {
    Config {
        server_port: 0,
        upload_folder: upload_folder.to_string_lossy().into_owned(),
        max_file_size: 1024 * 1024,
        allowed_origins: vec!["http://localhost:3000".to_string()],
    }
}

/// Build the full application router with all middleware layers.
///
/// This goes through the same `app` constructor as `main.rs`, so integration
/// tests exercise the production middleware stack (body limit, CORS, tracing).
pub fn build_test_app(upload_folder: &Path) -> Router {
    app(test_config(upload_folder))
}

/// Send a GET request to the given path and return the raw response.
pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).expect("response body should be valid JSON")
}

/// Encode a single `file` field as a multipart/form-data body.
pub fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

/// POST a file to `/upload-ifc` as a multipart upload.
pub async fn upload(app: Router, filename: &str, content: &[u8]) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri("/upload-ifc")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
        )
        .body(Body::from(multipart_body(filename, content)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Assert the standard error envelope and return its `code` field.
pub async fn error_code(response: Response<Body>, status: StatusCode) -> String {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["success"], false);
    json["error"]["code"]
        .as_str()
        .expect("error code should be a string")
        .to_string()
}
