//! Error types for tree comparison.

use thiserror::Error;

/// Result type alias for tree comparison operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building trees or running comparisons.
#[derive(Error, Debug)]
pub enum Error {
    /// The input structure is not a tree (cycle or shared child detected),
    /// or an operation sequence does not cover the tree it is applied to.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unrecognized algorithm selector.
    #[error("unsupported algorithm: {0:?} (expected \"structural\" or \"content-aware\")")]
    UnsupportedAlgorithm(String),

    /// XML parsing error.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
