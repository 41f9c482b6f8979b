//! # rootwalk metrics
//!
//! Process-wide resolution counters and logging setup.
//!
//! Every counter is kept twice: in an atomic on [`ResolverStats`], which the
//! CLI snapshots into its JSON report without a recorder installed, and
//! through the [`metrics`] facade so an embedding application can export
//! them.

use metrics::{counter, histogram};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub mod tracing_setup;

/// Global stats instance.
static STATS: OnceCell<ResolverStats> = OnceCell::new();

/// Gets or initializes the global stats instance.
pub fn stats() -> &'static ResolverStats {
    STATS.get_or_init(ResolverStats::new)
}

/// Resolution counters.
pub struct ResolverStats {
    /// Creation time.
    start_time: Instant,

    /// Top-level resolutions started.
    resolutions_total: AtomicU64,

    /// Resolutions that produced an address.
    resolutions_succeeded: AtomicU64,

    /// Resolutions that ended in a failure kind.
    resolutions_failed: AtomicU64,

    /// Queries sent, counting every hop of every walk.
    hops_total: AtomicU64,

    /// Nameserver hostnames resolved because a referral had no glue.
    sub_resolutions_total: AtomicU64,

    /// Individual transport attempts that failed.
    transport_failures_total: AtomicU64,
}

impl ResolverStats {
    /// Creates a zeroed stats instance.
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            resolutions_total: AtomicU64::new(0),
            resolutions_succeeded: AtomicU64::new(0),
            resolutions_failed: AtomicU64::new(0),
            hops_total: AtomicU64::new(0),
            sub_resolutions_total: AtomicU64::new(0),
            transport_failures_total: AtomicU64::new(0),
        }
    }

    /// Returns the time since the stats were created.
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    // =========================================================================
    // Resolution metrics
    // =========================================================================

    /// Records the start of a top-level resolution.
    pub fn record_resolution(&self) {
        self.resolutions_total.fetch_add(1, Ordering::Relaxed);
        counter!("rootwalk_resolutions_total").increment(1);
    }

    /// Records a resolution that produced an answer.
    pub fn record_success(&self, hops: u32, duration: Duration) {
        self.resolutions_succeeded.fetch_add(1, Ordering::Relaxed);
        counter!("rootwalk_resolutions_succeeded_total").increment(1);
        histogram!("rootwalk_resolution_hops").record(f64::from(hops));
        histogram!("rootwalk_resolution_duration_seconds").record(duration.as_secs_f64());
    }

    /// Records a resolution that failed with the given kind.
    pub fn record_failure(&self, kind: &'static str) {
        self.resolutions_failed.fetch_add(1, Ordering::Relaxed);
        counter!("rootwalk_failures_total", "kind" => kind).increment(1);
    }

    // =========================================================================
    // Walk metrics
    // =========================================================================

    /// Records one query sent to a nameserver.
    pub fn record_hop(&self) {
        self.hops_total.fetch_add(1, Ordering::Relaxed);
        counter!("rootwalk_hops_total").increment(1);
    }

    /// Records a glueless nameserver lookup.
    pub fn record_sub_resolution(&self) {
        self.sub_resolutions_total.fetch_add(1, Ordering::Relaxed);
        counter!("rootwalk_sub_resolutions_total").increment(1);
    }

    /// Records a failed transport attempt.
    pub fn record_transport_failure(&self, error: &'static str) {
        self.transport_failures_total.fetch_add(1, Ordering::Relaxed);
        counter!("rootwalk_transport_failures_total", "error" => error).increment(1);
    }

    /// Returns a point-in-time copy of the counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            uptime_secs: self.uptime().as_secs(),
            resolutions_total: self.resolutions_total.load(Ordering::Relaxed),
            resolutions_succeeded: self.resolutions_succeeded.load(Ordering::Relaxed),
            resolutions_failed: self.resolutions_failed.load(Ordering::Relaxed),
            hops_total: self.hops_total.load(Ordering::Relaxed),
            sub_resolutions_total: self.sub_resolutions_total.load(Ordering::Relaxed),
            transport_failures_total: self.transport_failures_total.load(Ordering::Relaxed),
        }
    }
}

impl Default for ResolverStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Seconds since the stats were created.
    pub uptime_secs: u64,
    /// Top-level resolutions started.
    pub resolutions_total: u64,
    /// Resolutions that produced an address.
    pub resolutions_succeeded: u64,
    /// Resolutions that failed.
    pub resolutions_failed: u64,
    /// Queries sent.
    pub hops_total: u64,
    /// Glueless nameserver lookups.
    pub sub_resolutions_total: u64,
    /// Failed transport attempts.
    pub transport_failures_total: u64,
}

/// Resolution timing helper.
pub struct ResolutionTimer {
    start: Instant,
}

impl ResolutionTimer {
    /// Starts a timer and counts the resolution.
    pub fn start() -> Self {
        stats().record_resolution();
        Self {
            start: Instant::now(),
        }
    }

    /// Returns the elapsed duration.
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Finishes timing a successful resolution.
    pub fn succeed(self, hops: u32) -> Duration {
        let elapsed = self.elapsed();
        stats().record_success(hops, elapsed);
        elapsed
    }

    /// Finishes timing a failed resolution.
    pub fn fail(self, kind: &'static str) -> Duration {
        stats().record_failure(kind);
        self.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_creation() {
        let stats = ResolverStats::new();
        assert!(stats.uptime() >= Duration::ZERO);
        assert_eq!(stats.snapshot().hops_total, 0);
    }

    #[test]
    fn test_counters_accumulate() {
        let stats = ResolverStats::new();
        stats.record_resolution();
        stats.record_hop();
        stats.record_hop();
        stats.record_transport_failure("timeout");
        stats.record_success(2, Duration::from_millis(40));

        let snap = stats.snapshot();
        assert_eq!(snap.resolutions_total, 1);
        assert_eq!(snap.hops_total, 2);
        assert_eq!(snap.transport_failures_total, 1);
        assert_eq!(snap.resolutions_succeeded, 1);
        assert_eq!(snap.resolutions_failed, 0);
    }

    #[test]
    fn test_timer_counts_globally() {
        let before = stats().snapshot().resolutions_total;
        let timer = ResolutionTimer::start();
        timer.fail("cycle_detected");
        assert!(stats().snapshot().resolutions_total > before);
    }

    #[test]
    fn test_snapshot_serializes() {
        let json = serde_json::to_value(ResolverStats::new().snapshot()).unwrap();
        assert_eq!(json["hops_total"], 0);
    }
}
