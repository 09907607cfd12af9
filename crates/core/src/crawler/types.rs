//! Types for the crawl orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CrawlerConfig;
use crate::knowledge::StoreError;

/// Per-page and global product caps for one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlLimits {
    /// Products kept per subcategory page.
    pub per_subcategory: usize,
    /// Products kept per page of a category without subcategories.
    pub per_category: usize,
    /// No new page is started once this many products are collected.
    pub total: usize,
}

impl Default for CrawlLimits {
    fn default() -> Self {
        Self::from(&CrawlerConfig::default())
    }
}

impl From<&CrawlerConfig> for CrawlLimits {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            per_subcategory: config.subcategory_limit,
            per_category: config.category_limit,
            total: config.total_limit,
        }
    }
}

/// Summary of a full crawl.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlStats {
    /// Categories handed to the store.
    pub categories_crawled: usize,
    /// Products collected across all pages.
    pub products_crawled: usize,
    /// Products new to the store.
    pub products_added: usize,
    pub base_url: String,
    pub pages_fetched: usize,
    pub pages_failed: usize,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Summary of a single-category refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryUpdate {
    pub category: String,
    pub category_id: u32,
    /// Products found on the category page.
    pub products_updated: usize,
    /// Products new to the store.
    pub products_added: usize,
}

/// Errors from the crawl orchestrator.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}
