//! Types for the knowledge store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::catalog::{Category, Subcategory};
use crate::extractor::ProductRecord;

/// A product in the knowledge store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Site product id (unique key).
    pub id: String,
    pub name: String,
    /// Category display name.
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<u32>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub colors: BTreeSet<String>,
    /// Absolute detail URL.
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

impl Product {
    /// Stamp an extracted record with the category it was listed under.
    pub fn from_record(
        record: ProductRecord,
        category: &Category,
        subcategory: Option<&Subcategory>,
    ) -> Self {
        Self {
            id: record.id,
            name: record.name,
            category: category.name.clone(),
            category_id: Some(category.id),
            subcategory: subcategory.map(|s| s.name.clone()),
            subcategory_id: subcategory.map(|s| s.id),
            price: record.price,
            colors: record.colors.into_iter().collect(),
            url: record.url,
            description: None,
            reference: record.reference,
        }
    }
}

/// Optional narrowing applied on top of the text match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchFilters {
    /// Category name, fuzzy matched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Color name, fuzzy matched against the product's colors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
}

impl SearchFilters {
    /// True when no filter is set.
    pub fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.color.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }
}

/// A search hit with its relevance score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredProduct {
    #[serde(flatten)]
    pub product: Product,
    /// 0-100 similarity, plus a bonus for exact substring matches.
    pub score: u32,
}

/// Store statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreStats {
    pub total_products: usize,
    pub total_categories: usize,
}

/// Errors from the knowledge store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Snapshot I/O error: {0}")]
    Io(String),

    #[error("Snapshot serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}
