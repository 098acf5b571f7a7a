//! Error types for rendering.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;

/// Errors that can occur while rendering a headline image.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font not found: {}", .0.display())]
    FontNotFound(PathBuf),

    #[error("invalid font file {}: {reason}", .path.display())]
    InvalidFont { path: PathBuf, reason: String },

    #[error("nothing to render: title is blank")]
    EmptyTitle,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("render task failed: {0}")]
    Task(String),
}
