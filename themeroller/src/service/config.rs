//! Image service configuration.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::pipeline::DEFAULT_CONCURRENCY_LIMIT;
use crate::render::{MagickBackend, RasterBackend, RenderBackend, DEFAULT_CONVERT_PROGRAM};

/// When waiters are released relative to the disk write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PersistPolicy {
    /// Release waiters as soon as rendering succeeds and write in the
    /// background. The in-flight entry keeps the bytes until the write
    /// completes, so callers arriving meanwhile still coalesce.
    #[default]
    Background,
    /// Release waiters only after the write completed.
    Durable,
}

impl FromStr for PersistPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "background" => Ok(PersistPolicy::Background),
            "durable" => Ok(PersistPolicy::Durable),
            other => Err(format!("unknown persist policy: {}", other)),
        }
    }
}

impl fmt::Display for PersistPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistPolicy::Background => write!(f, "background"),
            PersistPolicy::Durable => write!(f, "durable"),
        }
    }
}

/// Which rendering engine to use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    /// ImageMagick `convert` at the given path.
    Magick { program: PathBuf },
    /// In-process renderer.
    Raster,
}

impl Default for BackendConfig {
    fn default() -> Self {
        BackendConfig::Magick {
            program: PathBuf::from(DEFAULT_CONVERT_PROGRAM),
        }
    }
}

impl BackendConfig {
    /// Instantiates the configured backend.
    pub fn build(&self) -> Arc<dyn RenderBackend> {
        match self {
            BackendConfig::Magick { program } => Arc::new(MagickBackend::new(program.clone())),
            BackendConfig::Raster => Arc::new(RasterBackend::new()),
        }
    }
}

/// Configuration for [`ImageService`](super::ImageService).
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Directory holding cached images. Must exist at startup.
    pub cache_dir: PathBuf,
    /// Directory holding `icon/mask.png` and `texture/*.png`.
    pub asset_dir: PathBuf,
    /// Maximum renders running at once.
    pub concurrency: usize,
    /// Release policy relative to the disk write.
    pub persist: PersistPolicy,
    /// Rendering engine.
    pub backend: BackendConfig,
}

impl ServiceConfig {
    /// Creates a config with default concurrency, persistence and backend.
    pub fn new(cache_dir: impl Into<PathBuf>, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            asset_dir: asset_dir.into(),
            concurrency: DEFAULT_CONCURRENCY_LIMIT,
            persist: PersistPolicy::default(),
            backend: BackendConfig::default(),
        }
    }

    /// Set the render concurrency limit.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Set the persistence policy.
    pub fn with_persist(mut self, persist: PersistPolicy) -> Self {
        self.persist = persist;
        self
    }

    /// Set the rendering backend.
    pub fn with_backend(mut self, backend: BackendConfig) -> Self {
        self.backend = backend;
        self
    }
}
