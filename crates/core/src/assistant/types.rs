//! Types for the catalog assistant.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::knowledge::{Product, SearchFilters};

/// Intent of a user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryType {
    ProductSearch,
    CompanyInfo,
    General,
}

/// Structured reading of a free-text message.
///
/// Field names match the JSON produced by the language-model interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterpretedQuery {
    #[serde(rename = "type")]
    pub query_type: QueryType,
    /// Message with typos fixed.
    #[serde(default)]
    pub corrected_message: String,
    /// Product being looked for (e.g., "canecas").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<f64>,
}

impl InterpretedQuery {
    /// A plain product search for `message`, with no filters.
    pub fn product_search(message: &str) -> Self {
        Self {
            query_type: QueryType::ProductSearch,
            corrected_message: message.to_string(),
            product: Some(message.to_string()),
            category: None,
            color: None,
            price_min: None,
            price_max: None,
        }
    }
}

/// A direct store query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub text: String,
    #[serde(flatten)]
    pub filters: SearchFilters,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            filters: SearchFilters::default(),
        }
    }
}

/// Answer returned to front ends.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_url: Option<String>,
    pub message: String,
}

/// Errors from query interpreters.
#[derive(Debug, Error)]
pub enum InterpreterError {
    #[error("Interpreter request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid interpreter response: {0}")]
    InvalidResponse(String),
}
