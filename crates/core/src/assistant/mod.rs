//! Catalog assistant - answers product questions from the knowledge store.
//!
//! A message is first interpreted into a structured query. Product searches
//! for a known product keyword are answered with a filtered deep link into
//! the site; anything else falls back to a fuzzy store search.

mod interpreter;
mod types;

pub use interpreter::{PassthroughInterpreter, QueryInterpreter};
pub use types::*;

use std::sync::Arc;

use tracing::{debug, warn};

use crate::catalog::{CategoryCatalog, KeywordRoute};
use crate::filter_url::{FilterUrlBuilder, FilterUrlRequest};
use crate::knowledge::{KnowledgeStore, SearchFilters};

/// Products listed inline in a search answer.
const LISTED_PRODUCTS: usize = 5;

const GENERAL_REPLY: &str = "Posso ajudar a encontrar brindes promocionais. \
Indique o produto, a cor ou o preço que procura.";

/// Answers user messages against the catalog.
pub struct CatalogAssistant {
    store: Arc<dyn KnowledgeStore>,
    interpreter: Arc<dyn QueryInterpreter>,
    catalog: Arc<CategoryCatalog>,
    urls: FilterUrlBuilder,
}

impl CatalogAssistant {
    pub fn new(
        store: Arc<dyn KnowledgeStore>,
        interpreter: Arc<dyn QueryInterpreter>,
        catalog: Arc<CategoryCatalog>,
        base_url: &str,
    ) -> Self {
        Self {
            urls: FilterUrlBuilder::new(base_url, Arc::clone(&catalog)),
            store,
            interpreter,
            catalog,
        }
    }

    /// Run a structured query against the store.
    ///
    /// With no hits, the answer carries a site search link instead.
    pub fn search_products(&self, query: &SearchQuery) -> SearchResult {
        let hits = match self.store.search(&query.text, &query.filters) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(term = %query.text, error = %e, "Store search failed");
                Vec::new()
            }
        };

        if hits.is_empty() {
            let search_url = self.urls.search_url(&query.text);
            return SearchResult {
                products: Vec::new(),
                category_url: None,
                message: format!(
                    "Não encontrei produtos específicos. Tente pesquisar aqui: {}",
                    search_url
                ),
                filter_url: Some(search_url),
            };
        }

        let mut lines = vec![format!("Encontrei {} produtos:", hits.len())];
        for (i, hit) in hits.iter().take(LISTED_PRODUCTS).enumerate() {
            lines.push(format!("{}. {} - {}", i + 1, hit.product.name, hit.product.url));
        }
        if hits.len() > LISTED_PRODUCTS {
            lines.push(format!("...e mais {} produtos.", hits.len() - LISTED_PRODUCTS));
        }

        SearchResult {
            products: hits.into_iter().map(|hit| hit.product).collect(),
            category_url: None,
            filter_url: None,
            message: lines.join("\n"),
        }
    }

    /// Answer a free-text message.
    pub async fn answer(&self, message: &str) -> SearchResult {
        let query = match self.interpreter.interpret(message).await {
            Ok(query) => query,
            Err(e) => {
                warn!(
                    interpreter = self.interpreter.name(),
                    error = %e,
                    "Interpretation failed, searching raw message"
                );
                InterpretedQuery::product_search(message)
            }
        };
        debug!(query_type = ?query.query_type, product = ?query.product, "Message interpreted");

        match query.query_type {
            QueryType::ProductSearch => self.product_answer(message, &query),
            QueryType::CompanyInfo => self.company_answer(),
            QueryType::General => SearchResult {
                message: GENERAL_REPLY.to_string(),
                ..Default::default()
            },
        }
    }

    fn product_answer(&self, message: &str, query: &InterpretedQuery) -> SearchResult {
        let product_term = query
            .product
            .as_deref()
            .map(|p| p.trim().to_lowercase())
            .unwrap_or_default();
        let color = query
            .color
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());

        if let Some(route) = self.catalog.route_for(&product_term) {
            return self.routed_answer(message, query, route, color);
        }

        let text = if product_term.is_empty() {
            message.trim().to_string()
        } else {
            product_term
        };

        self.search_products(&SearchQuery {
            text,
            filters: SearchFilters {
                category: None,
                color: color.map(str::to_string),
                price_min: query.price_min,
                price_max: query.price_max,
            },
        })
    }

    fn routed_answer(
        &self,
        message: &str,
        query: &InterpretedQuery,
        route: &KeywordRoute,
        color: Option<&str>,
    ) -> SearchResult {
        let filter_url = self.urls.build(&FilterUrlRequest {
            category_id: route.category,
            subcategory_id: route.subcategory,
            color: color.map(str::to_string),
            price_min: query.price_min,
            price_max: query.price_max,
            search_term: None,
        });

        let mut lines = Vec::new();
        if !query.corrected_message.is_empty() && query.corrected_message != message {
            lines.push(format!("Entendi que procura: {}", query.corrected_message));
        }
        match color {
            Some(color) => lines.push(format!(
                "Pode encontrar {} {}s aqui: {}",
                route.label, color, filter_url
            )),
            None => lines.push(format!("Pode encontrar {} aqui: {}", route.label, filter_url)),
        }

        SearchResult {
            products: Vec::new(),
            category_url: Some(self.urls.listing_url(route.category, None)),
            filter_url: Some(filter_url),
            message: lines.join("\n"),
        }
    }

    fn company_answer(&self) -> SearchResult {
        let names: Vec<String> = self
            .catalog
            .all_categories()
            .into_iter()
            .map(|c| c.name)
            .collect();

        SearchResult {
            message: format!(
                "A Signa é especializada em brindes promocionais personalizados. \
                 Categorias principais: {}.",
                names.join(", ")
            ),
            ..Default::default()
        }
    }
}
