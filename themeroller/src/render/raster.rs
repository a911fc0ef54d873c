//! In-process rendering backend built on the `image` crate.
//!
//! Reproduces the two ImageMagick operations used by ThemeRoller:
//!
//! - **alpha shape**: every output pixel takes the background color, with
//!   alpha equal to the mask's grayscale intensity.
//! - **dissolve**: the overlay's alpha is scaled by the opacity percentage
//!   and the result is composited over an opaque canvas.
//!
//! Work runs on the blocking thread pool.

use std::io::Cursor;
use std::path::Path;

use bytes::Bytes;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use tracing::debug;

use crate::cache::BoxFuture;
use crate::request::parse_hex_rgb;

use super::{RenderBackend, RenderError, RenderInstruction};

/// Renders in-process; requires hex colors.
#[derive(Debug, Clone, Default)]
pub struct RasterBackend;

impl RasterBackend {
    pub fn new() -> Self {
        Self
    }

    /// Renders synchronously. Exposed for callers that manage their own threads.
    pub fn render_blocking(instruction: &RenderInstruction) -> Result<Bytes, RenderError> {
        let image = match instruction {
            RenderInstruction::AlphaShape { mask, background } => {
                alpha_shape(&load(mask)?, parse_color(background)?)
            }
            RenderInstruction::Dissolve {
                width,
                height,
                background,
                overlay,
                opacity,
            } => dissolve(
                *width,
                *height,
                parse_color(background)?,
                &load(overlay)?,
                *opacity,
            ),
        };
        encode_png(image)
    }
}

impl RenderBackend for RasterBackend {
    fn render(&self, instruction: RenderInstruction) -> BoxFuture<'_, Result<Bytes, RenderError>> {
        Box::pin(async move {
            let name = instruction.name();
            let bytes = tokio::task::spawn_blocking(move || Self::render_blocking(&instruction))
                .await
                .map_err(|e| RenderError::TaskFailed(e.to_string()))??;
            debug!(operation = name, size_bytes = bytes.len(), "raster render finished");
            Ok(bytes)
        })
    }

    fn name(&self) -> &str {
        "raster"
    }
}

fn parse_color(color: &str) -> Result<[u8; 3], RenderError> {
    parse_hex_rgb(color).ok_or_else(|| RenderError::UnsupportedColor(color.to_string()))
}

fn load(path: &Path) -> Result<DynamicImage, RenderError> {
    image::open(path).map_err(|e| RenderError::Asset {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn alpha_shape(mask: &DynamicImage, [r, g, b]: [u8; 3]) -> RgbaImage {
    let luma = mask.to_luma8();
    RgbaImage::from_fn(luma.width(), luma.height(), |x, y| {
        Rgba([r, g, b, luma.get_pixel(x, y).0[0]])
    })
}

fn dissolve(
    width: u32,
    height: u32,
    [r, g, b]: [u8; 3],
    overlay: &DynamicImage,
    opacity: u8,
) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255]));
    let overlay = overlay.to_rgba8();
    let opacity = u32::from(opacity.min(100));

    for y in 0..height.min(overlay.height()) {
        for x in 0..width.min(overlay.width()) {
            let src = overlay.get_pixel(x, y).0;
            // Alpha scaled to 0..=25500 to stay in integer arithmetic.
            let alpha = u32::from(src[3]) * opacity;
            let dst = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                let blended =
                    u32::from(src[c]) * alpha + u32::from(dst.0[c]) * (25_500 - alpha);
                dst.0[c] = ((blended + 12_750) / 25_500) as u8;
            }
        }
    }
    canvas
}

fn encode_png(image: RgbaImage) -> Result<Bytes, RenderError> {
    let mut buffer = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image)
        .write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(Bytes::from(buffer.into_inner()))
}
