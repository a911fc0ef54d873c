//! Rendering backend abstraction.
//!
//! A [`RenderInstruction`] is a declarative description of one image; a
//! [`RenderBackend`] turns it into encoded PNG bytes. Backends are only
//! ever invoked through the render queue, which caps how many run at once.

use std::path::{Path, PathBuf};

use bytes::Bytes;

use crate::cache::BoxFuture;
use crate::request::{ImageKind, ImageRequest};

use super::RenderError;

/// Location of the mask and overlay assets.
///
/// ```text
/// <root>/icon/mask.png
/// <root>/texture/<type>.png
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    root: PathBuf,
}

impl AssetPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the icon alpha mask.
    pub fn icon_mask(&self) -> PathBuf {
        self.root.join("icon").join("mask.png")
    }

    /// Path of a texture overlay asset.
    pub fn texture(&self, overlay_filename: &str) -> PathBuf {
        self.root.join("texture").join(overlay_filename)
    }
}

/// Declarative description of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderInstruction {
    /// Recolor `mask` with `background`, taking alpha from the mask's
    /// grayscale intensity.
    AlphaShape { mask: PathBuf, background: String },

    /// Fill a `width`×`height` canvas with `background` and composite
    /// `overlay` onto it with a dissolve blend at `opacity` percent.
    Dissolve {
        width: u32,
        height: u32,
        background: String,
        overlay: PathBuf,
        opacity: u8,
    },
}

impl RenderInstruction {
    /// Builds the instruction for a validated request.
    pub fn for_request(request: &ImageRequest, assets: &AssetPaths) -> Self {
        match request.kind() {
            ImageKind::Icon { color } => RenderInstruction::AlphaShape {
                mask: assets.icon_mask(),
                background: color.clone(),
            },
            ImageKind::Texture(texture) => RenderInstruction::Dissolve {
                width: texture.width,
                height: texture.height,
                background: texture.color.clone(),
                overlay: assets.texture(&texture.overlay_filename()),
                opacity: texture.opacity,
            },
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            RenderInstruction::AlphaShape { .. } => "alpha_shape",
            RenderInstruction::Dissolve { .. } => "dissolve",
        }
    }
}

/// Trait for rendering engines.
///
/// Implementations must be thread-safe (`Send + Sync`) because renders for
/// different keys run concurrently.
///
/// # Implementors
///
/// - [`MagickBackend`](super::MagickBackend) - spawns ImageMagick `convert`
/// - [`RasterBackend`](super::RasterBackend) - renders in-process with `image`
pub trait RenderBackend: Send + Sync {
    /// Render the instruction to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the engine cannot be run, an asset cannot be
    /// loaded, or the output cannot be produced.
    fn render(&self, instruction: RenderInstruction) -> BoxFuture<'_, Result<Bytes, RenderError>>;

    /// Backend name used in logs.
    fn name(&self) -> &str;
}
