//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Fetching (pages by result, fetch latency)
//! - Extraction and ingestion (products extracted, rejected, stored)
//! - Search (queries by outcome)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Fetching
// =============================================================================

/// Pages fetched by result.
pub static PAGES_FETCHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("brindes_pages_fetched_total", "Total listing pages fetched"),
        &["result"], // "success", "timeout", "connection", "status"
    )
    .unwrap()
});

/// Fetch duration in seconds.
pub static FETCH_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "brindes_fetch_duration_seconds",
            "Duration of a single page fetch",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Extraction & ingestion
// =============================================================================

/// Product records extracted from listing pages.
pub static PRODUCTS_EXTRACTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "brindes_products_extracted_total",
        "Product records extracted from listing pages",
    )
    .unwrap()
});

/// Listing items that looked like products but could not be extracted.
pub static EXTRACTION_REJECTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "brindes_extraction_rejects_total",
        "Listing items skipped during extraction",
    )
    .unwrap()
});

/// Products newly added to the knowledge store.
pub static PRODUCTS_STORED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "brindes_products_stored_total",
        "Products added to the knowledge store",
    )
    .unwrap()
});

// =============================================================================
// Search
// =============================================================================

/// Store searches by outcome.
pub static SEARCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("brindes_searches_total", "Knowledge store searches"),
        &["outcome"], // "hit", "miss"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(PAGES_FETCHED.clone()),
        Box::new(FETCH_DURATION.clone()),
        Box::new(PRODUCTS_EXTRACTED.clone()),
        Box::new(EXTRACTION_REJECTS.clone()),
        Box::new(PRODUCTS_STORED.clone()),
        Box::new(SEARCHES.clone()),
    ]
}

/// Register all core metrics in `registry`.
pub fn register_metrics(registry: &prometheus::Registry) -> Result<(), prometheus::Error> {
    for collector in all_metrics() {
        registry.register(collector)?;
    }
    Ok(())
}
