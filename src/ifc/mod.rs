//! IFC model reading: STEP parsing, entity access, element processing,
//! and bounding-box geometry extraction.

pub mod catalog;
pub mod file;
pub mod geometry;
pub mod parser;
pub mod processor;

pub use file::IfcFile;
pub use parser::ParseError;

/// Errors surfaced when opening and reading an IFC file.
#[derive(Debug, thiserror::Error)]
pub enum IfcError {
    #[error("failed to read IFC file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid IFC file: {0}")]
    Parse(#[from] ParseError),
}
