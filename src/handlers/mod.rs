//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives HTTP request data (multipart body, state, etc.)
//! 2. Performs the work (validation, IFC processing)
//! 3. Returns HTTP response (JSON, status code)

/// Service health endpoint
pub mod health;
/// Service info endpoint
pub mod info;
/// IFC upload and processing endpoint
pub mod upload;
