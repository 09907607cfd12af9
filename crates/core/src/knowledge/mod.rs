//! Knowledge store - the local index of crawled products and categories.
//!
//! The store is append-only for products (a product id is ingested once)
//! and replace-wholesale for categories. Search is fuzzy and ranked.

pub mod fuzzy;
mod snapshot;
mod types;

pub use snapshot::{SnapshotStore, SEARCH_LIMIT};
pub use types::*;

use crate::catalog::Category;

/// Trait for knowledge store implementations.
pub trait KnowledgeStore: Send + Sync {
    /// Add products whose id is non-empty and not yet known.
    ///
    /// Returns the number of products added. Persists after the merge.
    fn store_products(&self, products: &[Product]) -> Result<usize, StoreError>;

    /// Replace the category list and its lookup index. Persists.
    fn store_categories(&self, categories: &[Category]) -> Result<(), StoreError>;

    /// Ranked fuzzy search over product names and categories.
    fn search(
        &self,
        term: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<ScoredProduct>, StoreError>;

    /// Resolve a category by name, id string, or close spelling.
    fn get_category_info(&self, name_or_id: &str) -> Option<Category>;

    /// Get a product by id.
    fn get_product(&self, id: &str) -> Option<Product>;

    /// Get store statistics.
    fn stats(&self) -> StoreStats;
}
