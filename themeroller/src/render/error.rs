//! Error types for rendering operations.

use std::path::PathBuf;

use thiserror::Error;

use crate::pipeline::QueueError;

/// Errors that can occur while rendering an image.
///
/// Render errors are delivered to every caller waiting on the same cache
/// key, so the type is `Clone` and carries messages rather than sources.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
    /// The external renderer could not be started.
    #[error("Failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    /// The external renderer exited unsuccessfully or produced no image.
    #[error("Renderer failed ({status}): {stderr}")]
    Backend { status: String, stderr: String },

    /// A mask or overlay asset could not be loaded.
    #[error("Failed to load asset {}: {message}", path.display())]
    Asset { path: PathBuf, message: String },

    /// The backend cannot interpret the color token.
    #[error("Unsupported color: {0}")]
    UnsupportedColor(String),

    /// Encoding the rendered image failed.
    #[error("Encoding failed: {0}")]
    Encode(String),

    /// The render queue stopped before running the task.
    #[error("Render queue is closed")]
    QueueClosed,

    /// The render task panicked or was aborted.
    #[error("Render task failed: {0}")]
    TaskFailed(String),
}

impl From<QueueError> for RenderError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::Closed => RenderError::QueueClosed,
            QueueError::Abandoned => RenderError::TaskFailed(err.to_string()),
        }
    }
}
