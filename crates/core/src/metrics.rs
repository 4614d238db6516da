//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Analyzer calls (classification, recommendation)
//! - Batch processing
//! - Recorded tickets

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Analyzer
// =============================================================================

/// Classification calls by result.
pub static CLASSIFICATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_classifications_total",
            "Total ticket classification calls",
        ),
        &["result"], // "ok", "degraded", "failed"
    )
    .unwrap()
});

/// Classification round-trip duration in seconds.
pub static CLASSIFICATION_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "triage_classification_duration_seconds",
            "Duration of analyzer /analyze calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Recommendation calls by result.
pub static RECOMMENDATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_recommendations_total",
            "Total article recommendation calls",
        ),
        &["result"], // "ok", "unavailable", "failed"
    )
    .unwrap()
});

// =============================================================================
// Batches
// =============================================================================

/// Batches finished.
pub static BATCHES_COMPLETED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("triage_batches_completed_total", "Total batches completed").unwrap()
});

/// Batch items whose classification failed.
pub static BATCH_ITEM_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "triage_batch_item_failures_total",
        "Total batch items dropped after a classification failure",
    )
    .unwrap()
});

/// Batch duration in seconds.
pub static BATCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("triage_batch_duration_seconds", "Duration of batches").buckets(vec![
            0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0,
        ]),
        &["outcome"], // "complete", "partial", "failed"
    )
    .unwrap()
});

// =============================================================================
// Tickets
// =============================================================================

/// Tickets recorded by priority.
pub static TICKETS_RECORDED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_tickets_recorded_total", "Total tickets recorded"),
        &["priority"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(CLASSIFICATIONS_TOTAL.clone()),
        Box::new(CLASSIFICATION_DURATION.clone()),
        Box::new(RECOMMENDATIONS_TOTAL.clone()),
        Box::new(BATCHES_COMPLETED.clone()),
        Box::new(BATCH_ITEM_FAILURES.clone()),
        Box::new(BATCH_DURATION.clone()),
        Box::new(TICKETS_RECORDED.clone()),
    ]
}
