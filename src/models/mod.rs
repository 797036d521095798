//! Data models for the HTTP surface.

/// Shared API response envelope
pub mod response;
