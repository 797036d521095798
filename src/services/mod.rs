//! Processing services behind the HTTP handlers.
//!
//! Services contain the core processing logic separated from HTTP concerns.

pub mod ifc_service;
