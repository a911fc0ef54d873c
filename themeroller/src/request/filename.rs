//! Cache filename parsing and formatting.
//!
//! ThemeRoller images are addressed by canonical filenames:
//!
//! - Icons: `ui-icons_<color>_256x240.png`
//! - Textures: `ui-bg_<type>_<opacity>_<color>_<width>x<height>.png`
//!
//! The icon sprite size is fixed. Texture types use hyphens as the word
//! separator inside filenames (`diagonals-thick`).

use regex::Regex;
use std::sync::OnceLock;

use super::error::ValidationError;
use super::params::{IconParams, ImageParams, TextureParams};

/// Width and height of the icon sprite sheet.
pub const ICON_SPRITE_SIZE: (u32, u32) = (256, 240);

/// Filename prefix shared by all icon images.
pub const ICON_PREFIX: &str = "ui-icons";

/// Filename prefix shared by all texture images.
pub const TEXTURE_PREFIX: &str = "ui-bg";

/// Icon filename pattern.
///
/// - Group 1: color (word characters, e.g. "cc0000")
fn icon_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^ui-icons_(\w+)_256x240\.png$").expect("icon pattern is valid")
    })
}

/// Texture filename pattern.
///
/// - Group 1: type (letters, digits and hyphens, e.g. "diagonals-thick")
/// - Group 2: opacity
/// - Group 3: color
/// - Group 4: width
/// - Group 5: height
fn texture_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^ui-bg_([a-z0-9\-]+)_(\w+)_(\w+)_(\d+)x(\d+)\.png$")
            .expect("texture pattern is valid")
    })
}

/// Parses a canonical filename into raw image parameters.
///
/// Names starting with `ui-icons` must match the icon pattern; anything
/// else is matched against the texture pattern.
///
/// # Examples
///
/// ```
/// use themeroller::request::parse_filename;
///
/// let params = parse_filename("ui-bg_diagonals-thick_18_b81900_40x40.png").unwrap();
/// let texture = params.texture.unwrap();
/// assert_eq!(texture.kind.as_deref(), Some("diagonals-thick"));
/// assert_eq!(texture.width.as_deref(), Some("40"));
/// ```
pub fn parse_filename(filename: &str) -> Result<ImageParams, ValidationError> {
    let invalid = || ValidationError::InvalidFormat(filename.to_string());

    let is_icon = filename
        .get(..ICON_PREFIX.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(ICON_PREFIX));

    if is_icon {
        let captures = icon_pattern().captures(filename).ok_or_else(invalid)?;
        return Ok(ImageParams {
            icon: Some(IconParams {
                color: Some(captures[1].to_string()),
            }),
            texture: None,
        });
    }

    let captures = texture_pattern().captures(filename).ok_or_else(invalid)?;
    Ok(ImageParams {
        icon: None,
        texture: Some(TextureParams {
            kind: Some(captures[1].to_string()),
            opacity: Some(captures[2].to_string()),
            color: Some(captures[3].to_string()),
            width: Some(captures[4].to_string()),
            height: Some(captures[5].to_string()),
        }),
    })
}

/// Formats the canonical icon filename for a filename-spelled color.
pub fn icon_filename(color: &str) -> String {
    format!(
        "{}_{}_{}x{}.png",
        ICON_PREFIX, color, ICON_SPRITE_SIZE.0, ICON_SPRITE_SIZE.1
    )
}

/// Formats the canonical texture filename.
///
/// `kind` may use either separator; the filename always uses hyphens.
pub fn texture_filename(kind: &str, opacity: u8, color: &str, width: u32, height: u32) -> String {
    format!(
        "{}_{}_{}_{}_{}x{}.png",
        TEXTURE_PREFIX,
        kind.replace('_', "-"),
        opacity,
        color,
        width,
        height
    )
}
