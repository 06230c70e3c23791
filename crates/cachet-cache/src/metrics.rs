//! Metrics for cache facade operations.

use metrics::{counter, describe_counter};

/// Metric names for the cache facade.
pub mod names {
    /// Total facade operations, labelled by operation and outcome.
    pub const CACHE_OPERATIONS_TOTAL: &str = "cachet_cache_operations_total";
    /// Reads that found a value.
    pub const CACHE_HITS_TOTAL: &str = "cachet_cache_hits_total";
    /// Reads that found nothing.
    pub const CACHE_MISSES_TOTAL: &str = "cachet_cache_misses_total";
}

/// Outcome label for operations that succeeded.
pub const OUTCOME_OK: &str = "ok";

/// Register all metric descriptions.
pub fn register_metrics() {
    describe_counter!(
        names::CACHE_OPERATIONS_TOTAL,
        "Total number of cache facade operations"
    );
    describe_counter!(
        names::CACHE_HITS_TOTAL,
        "Total number of cache reads that returned a value"
    );
    describe_counter!(
        names::CACHE_MISSES_TOTAL,
        "Total number of cache reads that returned nothing"
    );
}

/// Cache metrics recorder.
#[derive(Clone)]
pub struct CacheMetrics;

impl CacheMetrics {
    /// Record a finished operation. `outcome` is `ok` or an error kind.
    pub fn operation(operation: &'static str, outcome: &'static str) {
        counter!(
            names::CACHE_OPERATIONS_TOTAL,
            "operation" => operation,
            "outcome" => outcome
        )
        .increment(1);
    }

    /// Record a read that found a value.
    pub fn hit(operation: &'static str) {
        counter!(names::CACHE_HITS_TOTAL, "operation" => operation).increment(1);
    }

    /// Record a read that found nothing.
    pub fn miss(operation: &'static str) {
        counter!(names::CACHE_MISSES_TOTAL, "operation" => operation).increment(1);
    }
}
