//! Integration tests for the health and info endpoints and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, get};
use tower::ServiceExt;

// ---------------------------------------------------------------------------
// Test: GET /health returns 200 with expected JSON fields
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = get(app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;

    assert_eq!(json["success"], true);
    assert_eq!(json["message"], "IFC Processor API is running");
    assert_eq!(json["data"]["status"], "healthy");
    assert!(json["data"]["upload_folder"].is_string());
    assert!(json["data"]["timestamp"].is_string());
}

// ---------------------------------------------------------------------------
// Test: GET / returns service metadata
// ---------------------------------------------------------------------------

#[tokio::test]
async fn root_describes_the_service() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["message"], "IFC Processor API");
    assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(json["health"], "/health");
}

// ---------------------------------------------------------------------------
// Test: Unknown route returns 404
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_route_returns_404() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());
    let response = get(app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Test: CORS preflight OPTIONS request returns correct headers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cors_preflight_returns_correct_headers() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());

    // CORS preflight requires custom headers, so we build the request manually.
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/upload-ifc")
        .header("Origin", "http://localhost:3000")
        .header("Access-Control-Request-Method", "POST")
        .header("Access-Control-Request-Headers", "content-type")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();

    // Access-Control-Allow-Origin must match the request origin.
    let allow_origin = headers
        .get("access-control-allow-origin")
        .expect("Missing Access-Control-Allow-Origin header")
        .to_str()
        .unwrap();
    assert_eq!(allow_origin, "http://localhost:3000");

    // Methods mirror the preflight request.
    let allow_methods = headers
        .get("access-control-allow-methods")
        .expect("Missing Access-Control-Allow-Methods header")
        .to_str()
        .unwrap();
    assert!(
        allow_methods.contains("POST"),
        "Allow-Methods should contain POST, got: {allow_methods}"
    );

    // Credentialed requests must be allowed for the configured frontend.
    assert_eq!(
        headers
            .get("access-control-allow-credentials")
            .expect("Missing Access-Control-Allow-Credentials header")
            .to_str()
            .unwrap(),
        "true"
    );
}

// ---------------------------------------------------------------------------
// Test: requests from an unlisted origin get no allow-origin header
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unlisted_origin_is_not_allowed() {
    let dir = tempfile::tempdir().unwrap();
    let app = common::build_test_app(dir.path());

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}
