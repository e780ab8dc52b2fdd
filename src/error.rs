//! Error types for loading chat data and rendering images.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for chatstat operations.
pub type Result<T> = std::result::Result<T, ChatStatError>;

/// Errors raised while reading inputs or producing outputs.
#[derive(Error, Debug)]
pub enum ChatStatError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse chat export {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid font {}: {message}", .path.display())]
    Font { path: PathBuf, message: String },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Invalid color: {0}")]
    InvalidColor(String),
}

impl ChatStatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
