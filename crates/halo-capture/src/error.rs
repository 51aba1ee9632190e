use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Capture directory not found: {}", .0.display())]
    CaptureNotFound(PathBuf),

    #[error("Capture metadata not found: {}", .0.display())]
    MetadataMissing(PathBuf),

    #[error("Token export file not found: {}", .0.display())]
    ExportNotFound(PathBuf),

    #[error("Attention payload {} is truncated ({bytes} bytes is not a whole number of f32 values)", .path.display())]
    Truncated { path: PathBuf, bytes: usize },

    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Core error: {0}")]
    Core(#[from] halo_core::error::CoreError),
}
