//! Service telemetry for observability and user feedback.
//!
//! Lock-free atomic counters with minimal overhead.
//!
//! ```text
//! ImageService ─────► ServiceMetrics ─────► MetricsSnapshot ─────► CLI
//!                    (atomic counters)    (point-in-time copy)
//! ```
//!
//! # Example
//!
//! ```
//! use themeroller::telemetry::ServiceMetrics;
//!
//! let metrics = ServiceMetrics::new();
//! metrics.request_received();
//! metrics.request_coalesced();
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.coalescing_rate(), 1.0);
//! ```

mod metrics;
mod snapshot;

pub use metrics::ServiceMetrics;
pub use snapshot::MetricsSnapshot;
