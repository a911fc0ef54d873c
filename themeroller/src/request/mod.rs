//! Parameter normalization for ThemeRoller images.
//!
//! Turns raw parameters or canonical filenames into validated
//! [`ImageRequest`]s and derives the canonical filename that serves as the
//! cache key.
//!
//! ```text
//! ImageParams ──┐
//!               ├──► ImageRequest ──► filename() ──► cache key
//! "ui-bg_…png" ─┘
//! ```

mod color;
mod error;
mod filename;
mod normalize;
mod params;

pub use color::{expand_color, filename_color, is_hex_color, normalize_color, parse_hex_rgb};
pub use error::ValidationError;
pub use filename::{
    icon_filename, parse_filename, texture_filename, ICON_PREFIX, ICON_SPRITE_SIZE,
    TEXTURE_PREFIX,
};
pub use normalize::{ImageInput, ImageKind, ImageRequest, TextureSpec, MAX_TEXTURE_DIMENSION};
pub use params::{IconParams, ImageParams, TextureParams};
