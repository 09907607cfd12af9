//! Types for product extraction.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A product as found on a listing page, before category stamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Numeric site id, as a string.
    pub id: String,
    /// Product name from the anchor text.
    pub name: String,
    /// Absolute detail URL.
    pub url: String,
    /// Listed price ("Desde" price when given as a range).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    /// Supplier reference code (e.g., "CT4521").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Color swatches shown on the listing item.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
}

/// Why a listing item was not turned into a product.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("No product link with a numeric id")]
    MissingId,

    #[error("Product {0} has no usable name")]
    MissingName(String),
}
