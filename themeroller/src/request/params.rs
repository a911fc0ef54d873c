//! Raw, unvalidated image parameters.
//!
//! These mirror what the web layer hands over after parsing a query string
//! or form: every leaf is an optional string. [`ImageRequest`](super::ImageRequest)
//! turns them into validated, typed requests.

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Structured image parameters: exactly one of `icon` or `texture`.
///
/// ```
/// use themeroller::request::ImageParams;
///
/// let params: ImageParams =
///     serde_json::from_str(r#"{"icon": {"color": "cc0000"}}"#).unwrap();
/// assert_eq!(params.icon.unwrap().color.as_deref(), Some("cc0000"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<IconParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture: Option<TextureParams>,
}

/// Parameters for an icon sprite.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconParams {
    #[serde(default)]
    pub color: Option<String>,
}

/// Parameters for a background texture.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureParams {
    /// Texture type, e.g. `diagonals-thick` or `glass`.
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub opacity: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub width: Option<String>,
    #[serde(default)]
    pub height: Option<String>,
}

impl ImageParams {
    /// Parameters for an icon of the given color.
    pub fn icon(color: impl Into<String>) -> Self {
        Self {
            icon: Some(IconParams {
                color: Some(color.into()),
            }),
            texture: None,
        }
    }

    /// Parameters for a fully specified texture.
    pub fn texture(
        kind: impl Into<String>,
        opacity: impl ToString,
        color: impl Into<String>,
        width: impl ToString,
        height: impl ToString,
    ) -> Self {
        Self {
            icon: None,
            texture: Some(TextureParams {
                kind: Some(kind.into()),
                opacity: Some(opacity.to_string()),
                color: Some(color.into()),
                width: Some(width.to_string()),
                height: Some(height.to_string()),
            }),
        }
    }

    /// Parses parameters from a JSON object such as
    /// `{"texture": {"type": "flat", "opacity": "75", ...}}`.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        serde_json::from_str(json).map_err(|e| ValidationError::InvalidFormat(e.to_string()))
    }
}
