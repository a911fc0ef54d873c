//! End-to-end tests for the image service.
//!
//! These tests render real PNGs with the in-process backend against assets
//! generated in a temporary directory, and verify:
//! - concurrent requests for one image share a single render
//! - rendered images persist across service restarts
//! - the render queue never exceeds its concurrency limit
//!
//! Run with: `cargo test --test image_service`

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use image::{GrayImage, Luma, Rgba, RgbaImage};
use tempfile::TempDir;

use themeroller::cache::{disk_cache_stats, BoxFuture, DiskImageStore};
use themeroller::render::{RasterBackend, RenderBackend, RenderError, RenderInstruction};
use themeroller::service::{BackendConfig, ImageService, PersistPolicy, ServiceConfig};
use themeroller::{ImageParams, ImageRequest};

// ============================================================================
// Helper Functions
// ============================================================================

/// Writes an icon mask and a few texture overlays under `root`.
fn write_assets(root: &Path) {
    std::fs::create_dir_all(root.join("icon")).unwrap();
    std::fs::create_dir_all(root.join("texture")).unwrap();

    GrayImage::from_fn(256, 240, |x, y| Luma([((x + y) % 256) as u8]))
        .save(root.join("icon").join("mask.png"))
        .unwrap();

    for (name, pixel) in [
        ("flat.png", Rgba([255, 255, 255, 255])),
        ("glass.png", Rgba([255, 255, 255, 128])),
        ("diagonals_thick.png", Rgba([0, 0, 0, 255])),
    ] {
        RgbaImage::from_pixel(40, 100, pixel)
            .save(root.join("texture").join(name))
            .unwrap();
    }
}

/// Delegates to [`RasterBackend`] while counting renders.
struct CountingRaster {
    inner: RasterBackend,
    renders: AtomicUsize,
    delay: Duration,
}

impl CountingRaster {
    fn new(delay: Duration) -> Self {
        Self {
            inner: RasterBackend::new(),
            renders: AtomicUsize::new(0),
            delay,
        }
    }

    fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }
}

impl RenderBackend for CountingRaster {
    fn render(&self, instruction: RenderInstruction) -> BoxFuture<'_, Result<Bytes, RenderError>> {
        Box::pin(async move {
            self.renders.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.inner.render(instruction).await
        })
    }

    fn name(&self) -> &str {
        "counting-raster"
    }
}

struct Fixture {
    _temp: TempDir,
    cache: std::path::PathBuf,
    assets: std::path::PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let cache = temp.path().join("cache");
        let assets = temp.path().join("template");
        std::fs::create_dir_all(&cache).unwrap();
        write_assets(&assets);
        Self {
            _temp: temp,
            cache,
            assets,
        }
    }

    fn config(&self) -> ServiceConfig {
        ServiceConfig::new(&self.cache, &self.assets)
            .with_backend(BackendConfig::Raster)
            .with_persist(PersistPolicy::Durable)
    }

    fn service(&self, backend: Arc<CountingRaster>) -> ImageService {
        ImageService::new(
            Arc::new(DiskImageStore::new(&self.cache)),
            backend,
            &self.config(),
        )
    }
}

fn decode(data: &[u8]) -> RgbaImage {
    image::load_from_memory(data).unwrap().to_rgba8()
}

// ============================================================================
// Scenarios
// ============================================================================

#[tokio::test]
async fn test_short_color_texture_end_to_end() {
    let fixture = Fixture::new();
    let backend = Arc::new(CountingRaster::new(Duration::from_millis(20)));
    let service = fixture.service(backend.clone());

    let params = || ImageParams::texture("flat", "75", "fff", "40", "100");
    let (a, b) = tokio::join!(service.get_params(params()), service.get_params(params()));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.filename, "ui-bg_flat_75_ffffff_40x100.png");
    assert_eq!(a.data, b.data);
    assert_eq!(backend.renders(), 1);

    let image = decode(&a.data);
    assert_eq!(image.dimensions(), (40, 100));
    assert_eq!(image.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));

    let on_disk = std::fs::read(fixture.cache.join("ui-bg_flat_75_ffffff_40x100.png")).unwrap();
    assert_eq!(on_disk, a.data.as_ref());

    // A restarted service serves the image from disk.
    let restarted = fixture.service(backend.clone());
    let again = restarted.get_params(params()).await.unwrap();
    assert_eq!(again.data, a.data);
    assert_eq!(backend.renders(), 1);
    assert_eq!(restarted.metrics().disk_hits, 1);
}

#[tokio::test]
async fn test_icon_sprite_end_to_end() {
    let fixture = Fixture::new();
    let service = ImageService::start(fixture.config()).await.unwrap();

    let image = service
        .get_filename("ui-icons_cc0000_256x240.png")
        .await
        .unwrap();
    assert_eq!(image.filename, "ui-icons_cc0000_256x240.png");

    let sprite = decode(&image.data);
    assert_eq!(sprite.dimensions(), (256, 240));
    assert_eq!(sprite.get_pixel(0, 0), &Rgba([0xcc, 0, 0, 0]));
    assert_eq!(sprite.get_pixel(100, 20), &Rgba([0xcc, 0, 0, 120]));
}

#[tokio::test]
async fn test_equivalent_requests_share_one_key() {
    let fixture = Fixture::new();
    let backend = Arc::new(CountingRaster::new(Duration::from_millis(20)));
    let service = fixture.service(backend.clone());

    let by_params = ImageRequest::new(ImageParams::texture(
        "diagonals_thick",
        "20",
        "#abc",
        "40",
        "100",
    ))
    .unwrap();
    let by_filename = ImageRequest::new("ui-bg_diagonals-thick_20_aabbcc_40x100.png").unwrap();
    assert_eq!(by_params, by_filename);

    let (a, b) = tokio::join!(service.get(&by_params), service.get(&by_filename));
    assert_eq!(a.unwrap().data, b.unwrap().data);
    assert_eq!(backend.renders(), 1);
}

#[tokio::test]
async fn test_queue_respects_concurrency_limit() {
    let fixture = Fixture::new();
    let backend = Arc::new(CountingRaster::new(Duration::from_millis(30)));
    let service = ImageService::new(
        Arc::new(DiskImageStore::new(&fixture.cache)),
        backend.clone(),
        &fixture.config().with_concurrency(2),
    );

    let requests: Vec<ImageRequest> = (0..6)
        .map(|i| ImageRequest::new(ImageParams::texture("glass", 10 * i, "336699", "40", "100")))
        .collect::<Result<_, _>>()
        .unwrap();

    let results = futures::future::join_all(requests.iter().map(|r| service.get(r))).await;
    assert!(results.iter().all(Result::is_ok));

    assert_eq!(backend.renders(), 6);
    assert_eq!(service.queue().peak_in_flight(), 2);

    let stats = disk_cache_stats(&fixture.cache).unwrap();
    assert_eq!(stats.files, 6);
}

#[tokio::test]
async fn test_missing_overlay_is_not_cached() {
    let fixture = Fixture::new();
    let backend = Arc::new(CountingRaster::new(Duration::ZERO));
    let service = fixture.service(backend.clone());

    let request = ImageRequest::parse("ui-bg_highlight-soft_75_cccccc_1x100.png").unwrap();
    assert!(service.get(&request).await.is_err());
    assert!(service.get(&request).await.is_err());

    assert_eq!(backend.renders(), 2);
    assert_eq!(disk_cache_stats(&fixture.cache).unwrap().files, 0);
}
