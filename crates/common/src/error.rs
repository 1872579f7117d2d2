//! Error types shared across motiontrace crates.

use std::path::PathBuf;

/// Top-level error type for motiontrace operations.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("Pose source error: {message}")]
    PoseSource { message: String },

    #[error("Render error: {message}")]
    Render { message: String },

    #[error("Reference timeline error: {message}")]
    Reference { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Run cancelled after {frames_processed} frame(s)")]
    Cancelled { frames_processed: u64 },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using MotionError.
pub type MotionResult<T> = Result<T, MotionError>;

impl MotionError {
    pub fn pose_source(msg: impl Into<String>) -> Self {
        Self::PoseSource {
            message: msg.into(),
        }
    }

    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render {
            message: msg.into(),
        }
    }

    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported {
            message: msg.into(),
        }
    }
}
