//! Types for the category catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// A top-level category of the target site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Site category id (`idCategoria`).
    pub id: u32,
    /// Display name, as shown on the site.
    pub name: String,
    /// Relative listing path (e.g., "/brindes/categoria.asp?idCategoria=30").
    pub url: String,
    /// Subcategories in site order.
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// A subcategory (`idSubCategoria`) under a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: u32,
    pub name: String,
}

/// A product keyword routed directly to a catalog listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRoute {
    /// Lowercase terms; any of them occurring in a product term selects this route.
    pub terms: Vec<String>,
    /// Plural label used in user-facing messages.
    pub label: String,
    /// Category id.
    pub category: u32,
    /// Subcategory id, if the route narrows below the category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<u32>,
}

/// On-disk shape of the catalog table.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct CatalogTable {
    pub version: String,
    pub categories: Vec<CategoryEntry>,
    #[serde(default)]
    pub colors: BTreeMap<String, u32>,
    #[serde(default)]
    pub keywords: Vec<KeywordRoute>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct CategoryEntry {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

/// Errors raised while loading a catalog table.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog table {path}: {message}")]
    Io { path: String, message: String },

    #[error("Failed to parse catalog table: {0}")]
    Parse(String),

    #[error("Invalid catalog table: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serialization_roundtrip() {
        let category = Category {
            id: 30,
            name: "Casa & Lar".to_string(),
            url: "/brindes/categoria.asp?idCategoria=30".to_string(),
            subcategories: vec![Subcategory {
                id: 164,
                name: "Canecas Personalizadas".to_string(),
            }],
        };

        let json = serde_json::to_string(&category).unwrap();
        let parsed: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, category);
    }

    #[test]
    fn test_category_without_subcategories_deserializes() {
        let json = r#"{"id": 34, "name": "Doces", "url": "/x"}"#;
        let parsed: Category = serde_json::from_str(json).unwrap();
        assert!(parsed.subcategories.is_empty());
    }

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::Invalid("duplicate category id 30".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid catalog table: duplicate category id 30"
        );
    }
}
