//! Rendering backends for ThemeRoller images.
//!
//! ```text
//! ImageRequest ──► RenderInstruction ──► Arc<dyn RenderBackend> ──► PNG bytes
//!                                              │
//!                                     ┌────────┴────────┐
//!                                     ▼                 ▼
//!                               MagickBackend     RasterBackend
//!                              (convert process)   (image crate)
//! ```

mod backend;
mod error;
mod magick;
mod raster;

pub use backend::{AssetPaths, RenderBackend, RenderInstruction};
pub use error::RenderError;
pub use magick::{MagickBackend, DEFAULT_CONVERT_PROGRAM};
pub use raster::RasterBackend;
