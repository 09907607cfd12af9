//! Crawl orchestrator - walks the category tree and feeds the knowledge store.
//!
//! Pages are fetched one at a time in catalog order. A page that cannot be
//! fetched contributes no products; the crawl always runs to completion or
//! to the global cap.

mod types;

pub use types::*;

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::catalog::{Category, CategoryCatalog};
use crate::config::Config;
use crate::extractor::{ProductExtractor, ProductRecord};
use crate::fetcher::PageFetcher;
use crate::knowledge::{KnowledgeStore, Product, StoreError};

/// Drives crawls against one site.
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    store: Arc<dyn KnowledgeStore>,
    catalog: Arc<CategoryCatalog>,
    limits: CrawlLimits,
    base_url: String,
}

#[derive(Debug, Default)]
struct PageCounters {
    fetched: usize,
    failed: usize,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        store: Arc<dyn KnowledgeStore>,
        catalog: Arc<CategoryCatalog>,
        config: &Config,
    ) -> Self {
        Self {
            fetcher,
            store,
            catalog,
            limits: CrawlLimits::from(&config.crawler),
            base_url: config.site.base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Override the crawl caps.
    pub fn with_limits(mut self, limits: CrawlLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Crawl every category page under `base_url` and index the results.
    ///
    /// Categories with subcategories are crawled one subcategory page at a
    /// time; others through their own listing page. The global cap is checked
    /// before each page, so the last page may overshoot it.
    pub async fn crawl_and_index(&self, base_url: &str) -> CrawlStats {
        let started_at = Utc::now();
        let base_url = base_url.trim_end_matches('/');
        let extractor = ProductExtractor::new(base_url);
        let categories = self.catalog.all_categories();

        info!(
            base_url = base_url,
            categories = categories.len(),
            catalog_version = self.catalog.version(),
            fetcher = self.fetcher.name(),
            "Starting crawl"
        );

        let mut products: Vec<Product> = Vec::new();
        let mut counters = PageCounters::default();

        'categories: for category in &categories {
            if category.subcategories.is_empty() {
                if products.len() >= self.limits.total {
                    break;
                }
                let url = format!("{}{}", base_url, self.catalog.page_url(category.id, None));
                let records = self
                    .crawl_page(&extractor, &url, self.limits.per_category, &mut counters)
                    .await;
                debug!(category = %category.name, added = records.len(), "Category page done");
                products.extend(
                    records
                        .into_iter()
                        .map(|r| Product::from_record(r, category, None)),
                );
                continue;
            }

            for sub in &category.subcategories {
                if products.len() >= self.limits.total {
                    break 'categories;
                }
                let url = format!(
                    "{}{}",
                    base_url,
                    self.catalog.page_url(category.id, Some(sub.id))
                );
                let records = self
                    .crawl_page(&extractor, &url, self.limits.per_subcategory, &mut counters)
                    .await;
                debug!(
                    category = %category.name,
                    subcategory = %sub.name,
                    added = records.len(),
                    "Subcategory page done"
                );
                products.extend(
                    records
                        .into_iter()
                        .map(|r| Product::from_record(r, category, Some(sub))),
                );
            }
        }

        let products_crawled = products.len();
        if let Err(e) = self.persist_categories(categories.clone()).await {
            error!(error = %e, "Failed to persist categories");
        }
        let products_added = match self.persist_products(products).await {
            Ok(added) => added,
            Err(e) => {
                error!(error = %e, "Failed to persist products");
                0
            }
        };

        let stats = CrawlStats {
            categories_crawled: categories.len(),
            products_crawled,
            products_added,
            base_url: base_url.to_string(),
            pages_fetched: counters.fetched,
            pages_failed: counters.failed,
            started_at,
            finished_at: Utc::now(),
        };

        info!(
            products = stats.products_crawled,
            added = stats.products_added,
            pages = stats.pages_fetched,
            failed = stats.pages_failed,
            "Crawl completed"
        );
        stats
    }

    /// Re-crawl one category's own listing page and store any new products.
    ///
    /// The category is resolved through the store (name, id or close
    /// spelling), falling back to the catalog table when the store has no
    /// categories yet.
    pub async fn update_category(&self, name_or_id: &str) -> Result<CategoryUpdate, CrawlError> {
        let category = self
            .store
            .get_category_info(name_or_id)
            .or_else(|| self.catalog_lookup(name_or_id))
            .ok_or_else(|| CrawlError::CategoryNotFound(name_or_id.to_string()))?;

        info!(category = %category.name, id = category.id, "Updating category");

        let extractor = ProductExtractor::new(&self.base_url);
        let url = format!("{}{}", self.base_url, category.url);
        let mut counters = PageCounters::default();
        let records = self
            .crawl_page(&extractor, &url, usize::MAX, &mut counters)
            .await;

        let products: Vec<Product> = records
            .into_iter()
            .map(|r| Product::from_record(r, &category, None))
            .collect();
        let products_updated = products.len();
        let products_added = self.persist_products(products).await?;

        Ok(CategoryUpdate {
            category: category.name,
            category_id: category.id,
            products_updated,
            products_added,
        })
    }

    // Store writes rewrite the snapshot file, so they run on the blocking pool.
    async fn persist_categories(&self, categories: Vec<Category>) -> Result<(), StoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.store_categories(&categories))
            .await
            .map_err(|e| StoreError::Io(format!("Store task failed: {}", e)))?
    }

    async fn persist_products(&self, products: Vec<Product>) -> Result<usize, StoreError> {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.store_products(&products))
            .await
            .map_err(|e| StoreError::Io(format!("Store task failed: {}", e)))?
    }

    fn catalog_lookup(&self, name_or_id: &str) -> Option<Category> {
        let key = name_or_id.trim();
        if let Ok(id) = key.parse::<u32>() {
            return self.catalog.category(id);
        }
        self.catalog
            .all_categories()
            .into_iter()
            .find(|c| c.name.to_lowercase() == key.to_lowercase())
    }

    /// Fetch and extract one listing page, keeping at most `limit` products.
    async fn crawl_page(
        &self,
        extractor: &ProductExtractor,
        url: &str,
        limit: usize,
        counters: &mut PageCounters,
    ) -> Vec<ProductRecord> {
        counters.fetched += 1;
        match self.fetcher.fetch(url).await {
            Ok(html) => {
                let mut records = extractor.extract_products(&html);
                records.truncate(limit);
                records
            }
            Err(e) => {
                counters.failed += 1;
                warn!(url = url, error = %e, "Skipping page");
                Vec::new()
            }
        }
    }
}
