//! The image request facade.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use tracing::{debug, info, instrument, warn};

use crate::cache::{DiskImageStore, ImageStore};
use crate::pipeline::{Admission, InFlightRegistry, RenderQueue, WaitError};
use crate::render::{AssetPaths, RenderBackend, RenderError, RenderInstruction};
use crate::request::{ImageParams, ImageRequest};
use crate::telemetry::{MetricsSnapshot, ServiceMetrics};

use super::{ImageError, PersistPolicy, ServiceConfig, ServiceError};

/// An encoded image together with its canonical filename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedImage {
    /// Canonical filename (also the cache key).
    pub filename: String,
    /// Encoded PNG bytes.
    pub data: Bytes,
}

/// Serves ThemeRoller images from the cache, rendering on a miss.
///
/// Cheap to clone; clones share the registry, queue, store and metrics.
#[derive(Clone)]
pub struct ImageService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    store: Arc<dyn ImageStore>,
    backend: Arc<dyn RenderBackend>,
    queue: RenderQueue,
    in_flight: InFlightRegistry<Bytes, RenderError>,
    assets: AssetPaths,
    persist: PersistPolicy,
    metrics: Arc<ServiceMetrics>,
}

impl ImageService {
    /// Starts a service backed by the on-disk cache in `config.cache_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::MissingCacheDirectory`] if the cache
    /// directory does not exist, or [`ServiceError::Config`] if the
    /// concurrency limit is zero.
    pub async fn start(config: ServiceConfig) -> Result<Self, ServiceError> {
        if config.concurrency == 0 {
            return Err(ServiceError::Config(
                "concurrency must be at least 1".to_string(),
            ));
        }

        let is_dir = tokio::fs::metadata(&config.cache_dir)
            .await
            .map(|m| m.is_dir())
            .unwrap_or(false);
        if !is_dir {
            return Err(ServiceError::MissingCacheDirectory(config.cache_dir.clone()));
        }

        if !config.asset_dir.is_dir() {
            warn!(
                assets = %config.asset_dir.display(),
                "Asset directory not found; renders will fail"
            );
        }

        let store: Arc<dyn ImageStore> = Arc::new(DiskImageStore::new(&config.cache_dir));
        let backend = config.backend.build();

        info!(
            cache = %config.cache_dir.display(),
            assets = %config.asset_dir.display(),
            backend = backend.name(),
            concurrency = config.concurrency,
            persist = %config.persist,
            "Image service started"
        );

        Ok(Self::new(store, backend, &config))
    }

    /// Creates a service from explicit components.
    ///
    /// `config.cache_dir` is ignored; `store` is used instead.
    ///
    /// # Panics
    ///
    /// Panics if `config.concurrency` is zero or if called outside a Tokio
    /// runtime.
    pub fn new(
        store: Arc<dyn ImageStore>,
        backend: Arc<dyn RenderBackend>,
        config: &ServiceConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                store,
                backend,
                queue: RenderQueue::new(config.concurrency, "render"),
                in_flight: InFlightRegistry::new(),
                assets: AssetPaths::new(&config.asset_dir),
                persist: config.persist,
                metrics: Arc::new(ServiceMetrics::new()),
            }),
        }
    }

    /// Returns the image for `request`.
    ///
    /// Concurrent calls for the same image share one generation. The
    /// generation runs as its own task, so dropping the returned future
    /// does not cancel it and the result still lands in the cache.
    pub async fn get(&self, request: &ImageRequest) -> Result<RenderedImage, ImageError> {
        let inner = &self.inner;
        inner.metrics.request_received();

        let key = request.filename().to_string();
        let waiter = match inner.in_flight.begin_or_join(&key) {
            Admission::Started(waiter) => {
                tokio::spawn(Arc::clone(inner).generate(request.clone()));
                waiter
            }
            Admission::Joined(waiter) => {
                debug!(key = %key, "Coalesced with in-flight generation");
                inner.metrics.request_coalesced();
                waiter
            }
        };

        match waiter.wait().await {
            Ok(data) => Ok(RenderedImage {
                filename: key,
                data,
            }),
            Err(WaitError::Failed(e)) => Err(ImageError::Render(e)),
            Err(WaitError::Abandoned) => Err(ImageError::Abandoned(key)),
        }
    }

    /// Validates a canonical filename and returns its image.
    pub async fn get_filename(&self, filename: &str) -> Result<RenderedImage, ImageError> {
        let request = ImageRequest::parse(filename)?;
        self.get(&request).await
    }

    /// Validates raw parameters and returns their image.
    pub async fn get_params(&self, params: ImageParams) -> Result<RenderedImage, ImageError> {
        let request = ImageRequest::from_params(params)?;
        self.get(&request).await
    }

    /// Takes a snapshot of the service counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Returns the directory holding render assets.
    pub fn asset_dir(&self) -> &Path {
        self.inner.assets.root()
    }

    /// Returns the active persistence policy.
    pub fn persist_policy(&self) -> PersistPolicy {
        self.inner.persist
    }

    /// Returns the render queue.
    pub fn queue(&self) -> &RenderQueue {
        &self.inner.queue
    }

    /// Returns the number of generations currently in flight.
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.len()
    }
}

impl ServiceInner {
    /// Produces the bytes for one key and settles its registry entry.
    #[instrument(skip_all, fields(key = %request.filename()))]
    async fn generate(self: Arc<Self>, request: ImageRequest) {
        let key = request.filename();
        let guard = EntryGuard::new(&self.in_flight, key);

        match self.store.read(key).await {
            Ok(Some(data)) => {
                debug!(bytes = data.len(), "Disk cache hit");
                self.metrics.disk_hit();
                guard.complete(Ok(data));
                return;
            }
            Ok(None) => self.metrics.disk_miss(),
            Err(e) => {
                warn!(error = %e, "Disk cache read failed, rendering instead");
                self.metrics.disk_read_error();
            }
        }

        let data = match self.render(&request).await {
            Ok(data) => data,
            Err(e) => {
                warn!(error = %e, "Render failed");
                self.metrics.render_failed();
                guard.complete(Err(e));
                return;
            }
        };

        match self.persist {
            PersistPolicy::Background => {
                guard.publish(data.clone());
                self.write(key, data).await;
                guard.release();
            }
            PersistPolicy::Durable => {
                self.write(key, data.clone()).await;
                guard.complete(Ok(data));
            }
        }
    }

    async fn render(&self, request: &ImageRequest) -> Result<Bytes, RenderError> {
        let instruction = RenderInstruction::for_request(request, &self.assets);
        let backend = Arc::clone(&self.backend);
        let metrics = Arc::clone(&self.metrics);

        self.queue
            .enqueue(async move {
                metrics.render_started();
                let start = Instant::now();
                let result = backend.render(instruction).await;
                debug!(
                    backend = backend.name(),
                    duration_ms = start.elapsed().as_millis() as u64,
                    ok = result.is_ok(),
                    "Render finished"
                );
                result
            })
            .await
            .unwrap_or_else(|e| Err(e.into()))
    }

    async fn write(&self, key: &str, data: Bytes) {
        let size = data.len();
        match self.store.write(key, data).await {
            Ok(()) => debug!(bytes = size, "Stored in disk cache"),
            Err(e) => {
                warn!(error = %e, "Disk cache write failed");
                self.metrics.write_failed();
            }
        }
    }
}

/// Owns a registry entry for the duration of one generation.
///
/// If the generation ends without settling the entry (a panic inside the
/// task), the entry is released on drop and its waiters observe
/// [`WaitError::Abandoned`] instead of hanging.
struct EntryGuard<'a> {
    registry: &'a InFlightRegistry<Bytes, RenderError>,
    key: &'a str,
    armed: bool,
}

impl<'a> EntryGuard<'a> {
    fn new(registry: &'a InFlightRegistry<Bytes, RenderError>, key: &'a str) -> Self {
        Self {
            registry,
            key,
            armed: true,
        }
    }

    /// Delivers the bytes while keeping the entry registered.
    fn publish(&self, data: Bytes) {
        self.registry.publish(self.key, Ok(data));
    }

    fn complete(mut self, result: Result<Bytes, RenderError>) {
        self.armed = false;
        self.registry.complete_and_release(self.key, result);
    }

    fn release(mut self) {
        self.armed = false;
        self.registry.release(self.key);
    }
}

impl Drop for EntryGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(key = self.key, "Generation ended without an outcome");
            self.registry.release(self.key);
        }
    }
}
