//! Persistent cache for rendered images.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │              Arc<dyn ImageStore>            │
//! │                                             │
//! │  canonical filename → encoded image bytes   │
//! └──────────────┬───────────────────┬──────────┘
//!                │                   │
//!                ▼                   ▼
//!        DiskImageStore      MemoryImageStore
//!     (flat directory, no     (process-local)
//!      eviction)
//! ```

mod disk;
mod memory;
mod traits;

pub use disk::{disk_cache_stats, DiskCacheStats, DiskImageStore};
pub use memory::MemoryImageStore;
pub use traits::{is_valid_key, BoxFuture, CacheError, ImageStore};
