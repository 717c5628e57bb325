//! Error types for dataset file operations.

use thiserror::Error;

/// Errors raised while reading or writing dataset files.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("PLY parsing error: {0}")]
    Ply(String),

    #[error("Missing '{property}' at vertex {index}")]
    MissingProperty { property: &'static str, index: usize },
}
