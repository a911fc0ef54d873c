//! Image service facade.
//!
//! Ties the normalizer, cache store, render queue and in-flight registry
//! together behind a single `get` call.
//!
//! # Architecture
//!
//! ```text
//! ImageRequest
//!     │ filename()
//!     ▼
//! InFlightRegistry::begin_or_join ──── Joined ────────────────┐
//!     │ Started                                               │
//!     ▼                                                       │
//! spawned generation task                                     │
//!     ├─► ImageStore::read ── hit ──► complete_and_release ───┤
//!     │ miss                                                  │
//!     ├─► RenderQueue::enqueue(RenderBackend::render)         │
//!     │     ├─ Err ──► complete_and_release(Err) ─────────────┤
//!     │     └─ Ok ──► publish ──► ImageStore::write ──► release
//!     │                  └────────────────────────────────────┤
//!     ▼                                                       ▼
//!                                                       Waiter::wait
//! ```
//!
//! # Example
//!
//! ```ignore
//! use themeroller::service::{ImageService, ServiceConfig};
//!
//! let service = ImageService::start(ServiceConfig::new(cache_dir, asset_dir)).await?;
//! let image = service.get_filename("ui-icons_222222_256x240.png").await?;
//! std::fs::write(&image.filename, &image.data)?;
//! ```

mod config;
mod error;
mod facade;

pub use config::{BackendConfig, PersistPolicy, ServiceConfig};
pub use error::{ImageError, ServiceError};
pub use facade::{ImageService, RenderedImage};
