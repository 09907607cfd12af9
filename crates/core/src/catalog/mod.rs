//! Category catalog - the static category/subcategory/color tables of the
//! target site.
//!
//! The table is versioned reference data shipped with the crate
//! (`data/catalog.toml`) and loaded once at startup. Deployments can point
//! `catalog.path` at a replacement table when the site renumbers ids.

mod types;

pub use types::*;

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::debug;

/// Path of the category listing page on the target site.
pub const LISTING_PATH: &str = "/brindes/categoria.asp";

const EMBEDDED_TABLE: &str = include_str!("data/catalog.toml");

/// Loaded, validated catalog table.
#[derive(Debug, Clone)]
pub struct CategoryCatalog {
    version: String,
    categories: Vec<CategoryEntry>,
    colors: HashMap<String, u32>,
    keywords: Vec<KeywordRoute>,
}

impl CategoryCatalog {
    /// Load the table compiled into the crate.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_toml_str(EMBEDDED_TABLE)
    }

    /// Load a table from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path).map_err(|e| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&raw)
    }

    /// Parse and validate a table from TOML text.
    pub fn from_toml_str(raw: &str) -> Result<Self, CatalogError> {
        let table: CatalogTable =
            toml::from_str(raw).map_err(|e| CatalogError::Parse(e.to_string()))?;
        validate_table(&table)?;

        debug!(
            version = %table.version,
            categories = table.categories.len(),
            colors = table.colors.len(),
            "Catalog table loaded"
        );

        Ok(Self {
            version: table.version,
            categories: table.categories,
            colors: table
                .colors
                .into_iter()
                .map(|(name, id)| (name.to_lowercase(), id))
                .collect(),
            keywords: table
                .keywords
                .into_iter()
                .map(|mut route| {
                    route.terms = route.terms.iter().map(|t| t.to_lowercase()).collect();
                    route
                })
                .collect(),
        })
    }

    /// Version string of the loaded table.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All categories, in table order, with their listing URLs.
    pub fn all_categories(&self) -> Vec<Category> {
        self.categories
            .iter()
            .map(|entry| self.to_category(entry))
            .collect()
    }

    /// Look up one category by id.
    pub fn category(&self, id: u32) -> Option<Category> {
        self.categories
            .iter()
            .find(|entry| entry.id == id)
            .map(|entry| self.to_category(entry))
    }

    /// Relative listing path for a category, optionally narrowed to a subcategory.
    pub fn page_url(&self, category_id: u32, subcategory_id: Option<u32>) -> String {
        match subcategory_id {
            Some(sub) => format!(
                "{}?idCategoria={}&idSubCategoria={}",
                LISTING_PATH, category_id, sub
            ),
            None => format!("{}?idCategoria={}", LISTING_PATH, category_id),
        }
    }

    /// Site color id for a color name (case-insensitive).
    pub fn color_id(&self, color: &str) -> Option<u32> {
        self.colors.get(&color.trim().to_lowercase()).copied()
    }

    /// First keyword route whose term occurs in `product_term`.
    pub fn route_for(&self, product_term: &str) -> Option<&KeywordRoute> {
        let term = product_term.to_lowercase();
        if term.trim().is_empty() {
            return None;
        }
        self.keywords
            .iter()
            .find(|route| route.terms.iter().any(|t| term.contains(t.as_str())))
    }

    fn to_category(&self, entry: &CategoryEntry) -> Category {
        Category {
            id: entry.id,
            name: entry.name.clone(),
            url: self.page_url(entry.id, None),
            subcategories: entry.subcategories.clone(),
        }
    }
}

fn validate_table(table: &CatalogTable) -> Result<(), CatalogError> {
    if table.version.trim().is_empty() {
        return Err(CatalogError::Invalid("version cannot be empty".to_string()));
    }

    let mut category_ids = HashSet::new();
    for category in &table.categories {
        if category.name.trim().is_empty() {
            return Err(CatalogError::Invalid(format!(
                "category {} has an empty name",
                category.id
            )));
        }
        if !category_ids.insert(category.id) {
            return Err(CatalogError::Invalid(format!(
                "duplicate category id {}",
                category.id
            )));
        }

        let mut sub_ids = HashSet::new();
        for sub in &category.subcategories {
            if !sub_ids.insert(sub.id) {
                return Err(CatalogError::Invalid(format!(
                    "duplicate subcategory id {} under category {}",
                    sub.id, category.id
                )));
            }
        }
    }

    for route in &table.keywords {
        let Some(category) = table.categories.iter().find(|c| c.id == route.category) else {
            return Err(CatalogError::Invalid(format!(
                "keyword route '{}' points at unknown category {}",
                route.label, route.category
            )));
        };
        if let Some(sub) = route.subcategory {
            if !category.subcategories.iter().any(|s| s.id == sub) {
                return Err(CatalogError::Invalid(format!(
                    "keyword route '{}' points at subcategory {} outside category {}",
                    route.label, sub, route.category
                )));
            }
        }
    }

    Ok(())
}
