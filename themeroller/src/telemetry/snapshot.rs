//! Point-in-time view of service counters.

use std::fmt;

/// Copy of [`ServiceMetrics`](super::ServiceMetrics) at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests: u64,
    pub coalesced: u64,
    pub disk_hits: u64,
    pub disk_misses: u64,
    pub disk_read_errors: u64,
    pub renders_started: u64,
    pub renders_failed: u64,
    pub writes_failed: u64,
}

impl MetricsSnapshot {
    /// Fraction of requests served by joining an in-flight generation.
    pub fn coalescing_rate(&self) -> f64 {
        if self.requests == 0 {
            0.0
        } else {
            self.coalesced as f64 / self.requests as f64
        }
    }

    /// Fraction of disk lookups that found the image.
    pub fn disk_hit_rate(&self) -> f64 {
        let lookups = self.disk_hits + self.disk_misses;
        if lookups == 0 {
            0.0
        } else {
            self.disk_hits as f64 / lookups as f64
        }
    }
}

impl fmt::Display for MetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requests: {}, coalesced: {} ({:.0}%), disk hits: {}, renders: {} ({} failed), write failures: {}",
            self.requests,
            self.coalesced,
            self.coalescing_rate() * 100.0,
            self.disk_hits,
            self.renders_started,
            self.renders_failed,
            self.writes_failed
        )
    }
}
