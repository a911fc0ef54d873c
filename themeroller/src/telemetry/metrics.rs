//! Lock-free counters for the image service.

use std::sync::atomic::{AtomicU64, Ordering};

use super::MetricsSnapshot;

/// Counters updated by the image service.
///
/// All methods use relaxed atomics; values are for observability only.
#[derive(Debug, Default)]
pub struct ServiceMetrics {
    requests: AtomicU64,
    coalesced: AtomicU64,
    disk_hits: AtomicU64,
    disk_misses: AtomicU64,
    disk_read_errors: AtomicU64,
    renders_started: AtomicU64,
    renders_failed: AtomicU64,
    writes_failed: AtomicU64,
}

impl ServiceMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A `get` call was made.
    pub fn request_received(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// A `get` call joined an in-flight generation.
    pub fn request_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn disk_hit(&self) {
        self.disk_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn disk_miss(&self) {
        self.disk_misses.fetch_add(1, Ordering::Relaxed);
    }

    /// A disk read failed for a reason other than a missing entry.
    pub fn disk_read_error(&self) {
        self.disk_read_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_started(&self) {
        self.renders_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn render_failed(&self) {
        self.renders_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn write_failed(&self) {
        self.writes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            disk_hits: self.disk_hits.load(Ordering::Relaxed),
            disk_misses: self.disk_misses.load(Ordering::Relaxed),
            disk_read_errors: self.disk_read_errors.load(Ordering::Relaxed),
            renders_started: self.renders_started.load(Ordering::Relaxed),
            renders_failed: self.renders_failed.load(Ordering::Relaxed),
            writes_failed: self.writes_failed.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        assert_eq!(ServiceMetrics::new().snapshot(), MetricsSnapshot::default());
    }

    #[test]
    fn test_counters_increment() {
        let metrics = ServiceMetrics::new();
        metrics.request_received();
        metrics.request_received();
        metrics.request_coalesced();
        metrics.disk_miss();
        metrics.disk_read_error();
        metrics.render_started();
        metrics.render_failed();
        metrics.write_failed();
        metrics.disk_hit();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests, 2);
        assert_eq!(snapshot.coalesced, 1);
        assert_eq!(snapshot.disk_hits, 1);
        assert_eq!(snapshot.disk_misses, 1);
        assert_eq!(snapshot.disk_read_errors, 1);
        assert_eq!(snapshot.renders_started, 1);
        assert_eq!(snapshot.renders_failed, 1);
        assert_eq!(snapshot.writes_failed, 1);
    }
}
