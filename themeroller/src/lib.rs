//! ThemeRoller - on-demand image generation for jQuery UI themes
//!
//! Serves the icon sprites and background textures a ThemeRoller theme
//! references. Each image is described by a handful of parameters, rendered
//! once through a bounded queue, and kept forever in a flat disk cache
//! keyed by its canonical filename. Concurrent requests for the same image
//! share a single render.
//!
//! # Modules
//!
//! - [`request`] - parameter validation and canonical filenames
//! - [`render`] - rendering backends (ImageMagick or in-process)
//! - [`pipeline`] - bounded render queue and in-flight coalescing
//! - [`cache`] - persistent image store
//! - [`service`] - the `get` facade tying everything together
//! - [`config`] - INI configuration file
//! - [`telemetry`] - service counters

pub mod cache;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod request;
pub mod service;
pub mod telemetry;

pub use request::{ImageParams, ImageRequest, ValidationError};
pub use service::{ImageError, ImageService, RenderedImage, ServiceConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
