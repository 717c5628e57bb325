//! Error types for dataset export.

use crate::render::RenderSubmissionError;
use nerfbake_data::DataError;
use thiserror::Error;

/// Errors that end an export invocation.
#[derive(Debug, Error)]
pub enum ExportError {
    /// Missing camera, invalid frame count or failed pre-flight check. Raised before anything is
    /// written to disk.
    #[error("{0}")]
    Configuration(String),

    #[error("Render submission error: {0}")]
    RenderSubmission(#[from] RenderSubmissionError),

    #[error("Filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Dataset file error: {0}")]
    Data(#[from] DataError),
}
