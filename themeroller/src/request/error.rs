//! Validation errors raised while building an [`ImageRequest`](super::ImageRequest).

use thiserror::Error;

/// Errors that can occur while validating image parameters.
///
/// These are caller mistakes: they are raised synchronously during request
/// construction and never reach the cache or the render queue.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// One or more required fields are absent or empty.
    #[error("missing {}", quoted(.0))]
    MissingFields(Vec<&'static str>),

    /// A filename matches neither the icon nor the texture pattern.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Neither an icon nor a texture was described.
    #[error("invalid parameters: expected an icon or a texture")]
    InvalidParameters,

    /// A field is present but its value is unusable.
    #[error("invalid {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },
}

fn quoted(fields: &[&'static str]) -> String {
    fields
        .iter()
        .map(|f| format!("\"{}\"", f))
        .collect::<Vec<_>>()
        .join(", ")
}
