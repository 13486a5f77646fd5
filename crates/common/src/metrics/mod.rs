//! Metrics and observability utilities
//!
//! Metrics go through the `metrics` facade with a shared name prefix. No
//! exporter is installed here; the embedding process decides where they go.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all ScholarNet metrics
pub const METRICS_PREFIX: &str = "scholarnet";

/// Histogram buckets for build-job duration (in seconds)
pub const JOB_DURATION_BUCKETS: &[f64] = &[
    0.050, // 50ms
    0.250, // 250ms
    1.000, // 1s
    5.000, // 5s
    15.00, // 15s
    60.00, // 1m
    300.0, // 5m
    600.0, // 10m - default budget
];

/// Register all metric descriptions
pub fn register_metrics() {
    // Job metrics
    describe_counter!(
        format!("{}_jobs_total", METRICS_PREFIX),
        Unit::Count,
        "Build jobs reaching a terminal state"
    );

    describe_histogram!(
        format!("{}_job_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Build job wall-clock duration in seconds"
    );

    describe_histogram!(
        format!("{}_phase_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Pipeline phase duration in seconds"
    );

    describe_counter!(
        format!("{}_skipped_records_total", METRICS_PREFIX),
        Unit::Count,
        "Malformed records absorbed during builds"
    );

    // Snapshot metrics
    describe_gauge!(
        format!("{}_snapshot_nodes", METRICS_PREFIX),
        Unit::Count,
        "Nodes in the last published snapshot"
    );

    describe_gauge!(
        format!("{}_snapshot_edges", METRICS_PREFIX),
        Unit::Count,
        "Edges in the last published snapshot"
    );

    // Cache metrics
    describe_counter!(
        format!("{}_cache_hits_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache hits"
    );

    describe_counter!(
        format!("{}_cache_misses_total", METRICS_PREFIX),
        Unit::Count,
        "Total cache misses"
    );

    tracing::info!("Metrics registered");
}

/// Times one pipeline phase
pub struct PhaseTimer {
    start: Instant,
    phase: &'static str,
}

impl PhaseTimer {
    /// Start timing a phase
    pub fn start(phase: &'static str) -> Self {
        Self {
            start: Instant::now(),
            phase,
        }
    }

    /// Record the phase duration, returning it in seconds
    pub fn finish(self) -> f64 {
        let duration = self.start.elapsed().as_secs_f64();
        record_phase(self.phase, duration);
        duration
    }
}

/// Helper to record a terminal job
pub fn record_job(status: &str, duration_secs: f64) {
    counter!(
        format!("{}_jobs_total", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .increment(1);

    histogram!(
        format!("{}_job_duration_seconds", METRICS_PREFIX),
        "status" => status.to_string()
    )
    .record(duration_secs);
}

/// Helper to record phase timing
pub fn record_phase(phase: &str, duration_secs: f64) {
    histogram!(
        format!("{}_phase_duration_seconds", METRICS_PREFIX),
        "phase" => phase.to_string()
    )
    .record(duration_secs);
}

/// Helper to record absorbed malformed records
pub fn record_skipped(kind: &str, count: usize) {
    if count == 0 {
        return;
    }
    counter!(
        format!("{}_skipped_records_total", METRICS_PREFIX),
        "kind" => kind.to_string()
    )
    .increment(count as u64);
}

/// Helper to record cache metrics
pub fn record_cache(hit: bool, cache_name: &str) {
    if hit {
        counter!(
            format!("{}_cache_hits_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    } else {
        counter!(
            format!("{}_cache_misses_total", METRICS_PREFIX),
            "cache" => cache_name.to_string()
        )
        .increment(1);
    }
}

/// Helper to record the size of a published snapshot
pub fn record_snapshot(nodes: usize, edges: usize) {
    gauge!(format!("{}_snapshot_nodes", METRICS_PREFIX)).set(nodes as f64);
    gauge!(format!("{}_snapshot_edges", METRICS_PREFIX)).set(edges as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration_buckets() {
        let mut prev = 0.0;
        for &bucket in JOB_DURATION_BUCKETS {
            assert!(bucket > prev);
            prev = bucket;
        }
        assert!(JOB_DURATION_BUCKETS.contains(&600.0));
    }

    #[test]
    fn test_phase_timer() {
        let timer = PhaseTimer::start("extraction");
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert!(timer.finish() > 0.0);
    }

    #[test]
    fn test_helpers_without_recorder() {
        // No recorder installed: calls must be no-ops
        record_job("completed", 1.5);
        record_skipped("publication", 2);
        record_cache(true, "snapshots");
        record_snapshot(10, 12);
    }
}
