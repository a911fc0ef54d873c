//! Validated image requests and cache key derivation.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use std::sync::OnceLock;

use super::color::{filename_color, normalize_color};
use super::error::ValidationError;
use super::filename::{icon_filename, parse_filename, texture_filename, ICON_SPRITE_SIZE};
use super::params::{IconParams, ImageParams, TextureParams};

/// Largest accepted texture width or height, in pixels.
pub const MAX_TEXTURE_DIMENSION: u32 = 4096;

/// Required texture fields, in the order they are reported when missing.
const TEXTURE_FIELDS: [&str; 5] = ["color", "height", "opacity", "type", "width"];

/// What a request renders.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ImageKind {
    /// The icon sprite sheet recolored with `color`.
    Icon { color: String },
    /// A solid canvas with a texture overlay.
    Texture(TextureSpec),
}

/// Normalized texture parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureSpec {
    /// Texture type with underscores as the word separator (`diagonals_thick`).
    pub kind: String,
    /// Overlay opacity, 0-100.
    pub opacity: u8,
    /// Normalized background color (`#rrggbb` for hex colors).
    pub color: String,
    pub width: u32,
    pub height: u32,
}

impl TextureSpec {
    /// Filename of the overlay asset for this texture type (`diagonals_thick.png`).
    pub fn overlay_filename(&self) -> String {
        format!("{}.png", self.kind)
    }
}

/// Input accepted by [`ImageRequest::new`]: structured parameters or a
/// canonical filename.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Params(ImageParams),
    Filename(String),
}

impl From<ImageParams> for ImageInput {
    fn from(params: ImageParams) -> Self {
        ImageInput::Params(params)
    }
}

impl From<&str> for ImageInput {
    fn from(filename: &str) -> Self {
        ImageInput::Filename(filename.to_string())
    }
}

impl From<String> for ImageInput {
    fn from(filename: String) -> Self {
        ImageInput::Filename(filename)
    }
}

/// A validated, immutable request for one ThemeRoller image.
///
/// The canonical filename doubles as the cache key. It is derived from the
/// normalized fields only, so semantically identical requests always share
/// a key, and it is computed at most once per instance.
///
/// # Example
///
/// ```
/// use themeroller::request::{ImageParams, ImageRequest};
///
/// let request = ImageRequest::new(ImageParams::icon("fff")).unwrap();
/// assert_eq!(request.filename(), "ui-icons_ffffff_256x240.png");
///
/// let parsed = ImageRequest::new("ui-icons_ffffff_256x240.png").unwrap();
/// assert_eq!(parsed, request);
/// ```
#[derive(Debug, Clone)]
pub struct ImageRequest {
    kind: ImageKind,
    filename: OnceLock<String>,
}

impl ImageRequest {
    /// Builds a request from structured parameters or a filename.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if a filename matches neither pattern,
    /// required fields are missing, or a field value is unusable.
    pub fn new(input: impl Into<ImageInput>) -> Result<Self, ValidationError> {
        match input.into() {
            ImageInput::Params(params) => Self::from_params(params),
            ImageInput::Filename(filename) => Self::parse(&filename),
        }
    }

    /// Builds a request from a canonical filename.
    pub fn parse(filename: &str) -> Result<Self, ValidationError> {
        Self::from_params(parse_filename(filename)?)
    }

    /// Builds a request from structured parameters.
    ///
    /// If both an icon and a texture are described, the icon wins.
    pub fn from_params(params: ImageParams) -> Result<Self, ValidationError> {
        let kind = match (params.icon, params.texture) {
            (Some(icon), _) => validate_icon(icon)?,
            (None, Some(texture)) => ImageKind::Texture(validate_texture(texture)?),
            (None, None) => return Err(ValidationError::InvalidParameters),
        };
        Ok(Self::from_kind(kind))
    }

    fn from_kind(kind: ImageKind) -> Self {
        Self {
            kind,
            filename: OnceLock::new(),
        }
    }

    /// Returns the normalized request.
    pub fn kind(&self) -> &ImageKind {
        &self.kind
    }

    /// Returns true for icon requests.
    pub fn is_icon(&self) -> bool {
        matches!(self.kind, ImageKind::Icon { .. })
    }

    /// Returns the normalized color (`#rrggbb` for hex colors).
    pub fn color(&self) -> &str {
        match &self.kind {
            ImageKind::Icon { color } => color,
            ImageKind::Texture(texture) => &texture.color,
        }
    }

    /// Returns the output dimensions in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        match &self.kind {
            ImageKind::Icon { .. } => ICON_SPRITE_SIZE,
            ImageKind::Texture(texture) => (texture.width, texture.height),
        }
    }

    /// Returns the canonical filename, which is also the cache key.
    pub fn filename(&self) -> &str {
        self.filename.get_or_init(|| match &self.kind {
            ImageKind::Icon { color } => icon_filename(filename_color(color)),
            ImageKind::Texture(t) => texture_filename(
                &t.kind,
                t.opacity,
                filename_color(&t.color),
                t.width,
                t.height,
            ),
        })
    }

    /// Returns the overlay asset filename for textures (`diagonals_thick.png`).
    pub fn overlay_filename(&self) -> Option<String> {
        match &self.kind {
            ImageKind::Icon { .. } => None,
            ImageKind::Texture(texture) => Some(texture.overlay_filename()),
        }
    }

    /// Converts back to structured parameters in normalized form.
    pub fn to_params(&self) -> ImageParams {
        match &self.kind {
            ImageKind::Icon { color } => ImageParams {
                icon: Some(IconParams {
                    color: Some(color.clone()),
                }),
                texture: None,
            },
            ImageKind::Texture(t) => ImageParams {
                icon: None,
                texture: Some(TextureParams {
                    kind: Some(t.kind.clone()),
                    opacity: Some(t.opacity.to_string()),
                    color: Some(t.color.clone()),
                    width: Some(t.width.to_string()),
                    height: Some(t.height.to_string()),
                }),
            },
        }
    }
}

impl PartialEq for ImageRequest {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl Eq for ImageRequest {}

impl Hash for ImageRequest {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
    }
}

impl fmt::Display for ImageRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filename())
    }
}

impl FromStr for ImageRequest {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<ImageParams> for ImageRequest {
    type Error = ValidationError;

    fn try_from(params: ImageParams) -> Result<Self, Self::Error> {
        Self::from_params(params)
    }
}

impl TryFrom<&str> for ImageRequest {
    type Error = ValidationError;

    fn try_from(filename: &str) -> Result<Self, Self::Error> {
        Self::parse(filename)
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn validate_icon(icon: IconParams) -> Result<ImageKind, ValidationError> {
    let color = present(&icon.color).ok_or_else(|| ValidationError::MissingFields(vec!["color"]))?;
    Ok(ImageKind::Icon {
        color: validate_color(color)?,
    })
}

fn validate_texture(texture: TextureParams) -> Result<TextureSpec, ValidationError> {
    let values = [
        present(&texture.color),
        present(&texture.height),
        present(&texture.opacity),
        present(&texture.kind),
        present(&texture.width),
    ];
    let missing: Vec<&'static str> = TEXTURE_FIELDS
        .iter()
        .zip(values.iter())
        .filter(|(_, value)| value.is_none())
        .map(|(field, _)| *field)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    let [Some(color), Some(height), Some(opacity), Some(kind), Some(width)] = values else {
        return Err(ValidationError::MissingFields(TEXTURE_FIELDS.to_vec()));
    };

    Ok(TextureSpec {
        kind: validate_kind(kind)?,
        opacity: validate_opacity(opacity)?,
        color: validate_color(color)?,
        width: validate_dimension("width", width)?,
        height: validate_dimension("height", height)?,
    })
}

fn validate_color(color: &str) -> Result<String, ValidationError> {
    // The bare color becomes one `_`-delimited filename segment.
    let bare = color.strip_prefix('#').unwrap_or(color);
    if bare.is_empty() || !bare.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidField {
            field: "color",
            value: color.to_string(),
        });
    }
    Ok(normalize_color(color))
}

fn validate_kind(kind: &str) -> Result<String, ValidationError> {
    if !kind
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidField {
            field: "type",
            value: kind.to_string(),
        });
    }
    Ok(kind.replace('-', "_"))
}

fn validate_opacity(opacity: &str) -> Result<u8, ValidationError> {
    opacity
        .parse::<u8>()
        .ok()
        .filter(|o| *o <= 100)
        .ok_or_else(|| ValidationError::InvalidField {
            field: "opacity",
            value: opacity.to_string(),
        })
}

fn validate_dimension(field: &'static str, value: &str) -> Result<u32, ValidationError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|v| (1..=MAX_TEXTURE_DIMENSION).contains(v))
        .ok_or_else(|| ValidationError::InvalidField {
            field,
            value: value.to_string(),
        })
}
