//! Service error types.

use std::path::PathBuf;

use thiserror::Error;

use crate::render::RenderError;
use crate::request::ValidationError;

/// Errors returned by [`ImageService::get`](super::ImageService::get).
///
/// `Clone` because one generation outcome is delivered to every caller
/// that asked for the same image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImageError {
    /// The request was malformed.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Rendering failed. Nothing was cached; a later request retries.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Generation ended without producing an outcome.
    #[error("Generation of {0} ended without a result")]
    Abandoned(String),
}

/// Errors that can occur while starting the service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The cache directory does not exist.
    #[error("Missing cache directory {}", .0.display())]
    MissingCacheDirectory(PathBuf),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_error_from_validation() {
        let err: ImageError = ValidationError::InvalidParameters.into();
        assert!(matches!(err, ImageError::Validation(_)));
        assert_eq!(
            err.to_string(),
            "invalid parameters: expected an icon or a texture"
        );
    }

    #[test]
    fn test_image_error_from_render() {
        let err: ImageError = RenderError::QueueClosed.into();
        assert_eq!(err.to_string(), "Render queue is closed");
    }

    #[test]
    fn test_service_error_display() {
        let err = ServiceError::MissingCacheDirectory(PathBuf::from("/tmp/cache"));
        assert_eq!(err.to_string(), "Missing cache directory /tmp/cache");
    }
}
