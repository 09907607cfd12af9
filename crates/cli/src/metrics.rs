//! Prometheus metrics for the command-line front end.
//!
//! Core counters (fetches, extraction, searches) are registered alongside
//! store gauges that are collected right before encoding.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntGauge, Registry, TextEncoder};
use tracing::warn;

use brindes_core::KnowledgeStore;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    if let Err(e) = register_metrics(&registry) {
        warn!(error = %e, "Failed to register metrics");
    }
    registry
});

/// Products currently in the knowledge store.
pub static STORE_PRODUCTS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("brindes_store_products", "Products in the knowledge store").unwrap()
});

/// Categories currently in the knowledge store.
pub static STORE_CATEGORIES: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("brindes_store_categories", "Categories in the knowledge store").unwrap()
});

fn register_metrics(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(STORE_PRODUCTS.clone()))?;
    registry.register(Box::new(STORE_CATEGORIES.clone()))?;
    brindes_core::metrics::register_metrics(registry)
}

/// Update store gauges from the current store contents.
pub fn collect_store_metrics(store: &dyn KnowledgeStore) {
    let stats = store.stats();
    STORE_PRODUCTS.set(stats.total_products as i64);
    STORE_CATEGORIES.set(stats.total_categories as i64);
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}
