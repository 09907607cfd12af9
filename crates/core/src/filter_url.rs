//! Filter-URL builder - deep links into the site's filtered listing.
//!
//! The site only accepts the filter query string with every key present and
//! in a fixed order, so unset values are emitted as empty segments.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::{CategoryCatalog, LISTING_PATH};

/// Page size requested from the site.
pub const PRODUCTS_PER_PAGE: u32 = 25;

/// Structured filter for a listing deep link.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterUrlRequest {
    pub category_id: u32,
    #[serde(default)]
    pub subcategory_id: Option<u32>,
    /// Color name, mapped through the catalog color table.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub price_min: Option<f64>,
    #[serde(default)]
    pub price_max: Option<f64>,
    #[serde(default)]
    pub search_term: Option<String>,
}

/// Builds filter URLs against one site root.
#[derive(Debug, Clone)]
pub struct FilterUrlBuilder {
    base_url: String,
    catalog: Arc<CategoryCatalog>,
}

impl FilterUrlBuilder {
    pub fn new(base_url: impl Into<String>, catalog: Arc<CategoryCatalog>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            catalog,
        }
    }

    /// Build the deep link. Identical requests give byte-identical URLs.
    pub fn build(&self, request: &FilterUrlRequest) -> String {
        let color_id = request
            .color
            .as_deref()
            .and_then(|c| self.catalog.color_id(c));

        let params: [(&str, String); 17] = [
            (
                "q",
                request
                    .search_term
                    .as_deref()
                    .map(|t| urlencoding::encode(t.trim()).into_owned())
                    .unwrap_or_default(),
            ),
            ("t", String::new()),
            ("idCategoria", id_param(Some(request.category_id))),
            ("idSubCategoria", id_param(request.subcategory_id)),
            ("idOcasiao", String::new()),
            ("idSector", String::new()),
            ("idCorPrincipal", id_param(color_id)),
            ("precoDe", price_param(request.price_min)),
            ("precoAte", price_param(request.price_max)),
            ("idMaterial", String::new()),
            ("idDimensao", String::new()),
            ("idGramagem", String::new()),
            ("idCapacidade", String::new()),
            ("idCapacidadePB", String::new()),
            ("corDaEscrita", String::new()),
            ("order", String::new()),
            ("prodPorPagina", PRODUCTS_PER_PAGE.to_string()),
        ];

        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}{}?{}", self.base_url, LISTING_PATH, query)
    }

    /// Absolute listing URL for a category, optionally narrowed to a subcategory.
    pub fn listing_url(&self, category_id: u32, subcategory_id: Option<u32>) -> String {
        format!(
            "{}{}",
            self.base_url,
            self.catalog.page_url(category_id, subcategory_id)
        )
    }

    /// Site-wide search link for a free-text term.
    pub fn search_url(&self, term: &str) -> String {
        format!(
            "{}/brindes/pesquisa.asp?q={}",
            self.base_url,
            urlencoding::encode(term.trim())
        )
    }
}

/// Zero ids are treated as unset.
fn id_param(id: Option<u32>) -> String {
    id.filter(|&id| id != 0)
        .map(|id| id.to_string())
        .unwrap_or_default()
}

/// Zero or non-finite prices are treated as unset. Whole prices drop the ".0".
fn price_param(price: Option<f64>) -> String {
    price
        .filter(|p| p.is_finite() && *p != 0.0)
        .map(|p| p.to_string())
        .unwrap_or_default()
}
