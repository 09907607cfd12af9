//! Snapshot-backed knowledge store.
//!
//! State lives in memory behind one `RwLock`. Every mutation rewrites a JSON
//! snapshot (temp file + rename), so a crash mid-write leaves the previous
//! snapshot intact.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::fuzzy::{partial_ratio, ratio};
use super::{KnowledgeStore, Product, ScoredProduct, SearchFilters, StoreError, StoreStats};
use crate::catalog::Category;
use crate::metrics;

/// Maximum number of hits returned by a search.
pub const SEARCH_LIMIT: usize = 20;

/// Hits must score strictly above this.
const SCORE_THRESHOLD: u32 = 60;
/// Bonus when the term occurs verbatim in the product name.
const SUBSTRING_BONUS: u32 = 20;
/// Color filter: some product color must score strictly above this.
const COLOR_THRESHOLD: u32 = 70;
/// Category filter: the product category must score at least this.
const CATEGORY_THRESHOLD: u32 = 70;
/// Fuzzy category lookup: a category name must score strictly above this.
const CATEGORY_LOOKUP_THRESHOLD: u32 = 80;

const SNAPSHOT_VERSION: u32 = 1;

/// Knowledge store persisted as a single JSON snapshot.
pub struct SnapshotStore {
    path: Option<PathBuf>,
    state: RwLock<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    products: Vec<Product>,
    product_index: BTreeMap<String, usize>,
    categories: Vec<Category>,
    category_index: BTreeMap<String, usize>,
}

#[derive(Serialize)]
struct SnapshotRef<'a> {
    version: u32,
    saved_at: DateTime<Utc>,
    products: &'a [Product],
    categories: &'a [Category],
    product_index: &'a BTreeMap<String, usize>,
    category_index: &'a BTreeMap<String, usize>,
}

#[derive(Deserialize)]
struct Snapshot {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl SnapshotStore {
    /// Open a store backed by `path`, restoring the snapshot if one exists.
    ///
    /// A missing file starts an empty store. A corrupt file is logged and
    /// also starts empty; it is overwritten on the next mutation.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let state = match fs::read(&path) {
            Ok(bytes) => match serde_json::from_slice::<Snapshot>(&bytes) {
                Ok(snapshot) => {
                    if snapshot.version != SNAPSHOT_VERSION {
                        warn!(
                            path = %path.display(),
                            version = snapshot.version,
                            expected = SNAPSHOT_VERSION,
                            "Snapshot version differs, loading anyway"
                        );
                    }
                    let state = StoreState::from_snapshot(snapshot.products, snapshot.categories);
                    info!(
                        path = %path.display(),
                        saved_at = %snapshot.saved_at,
                        products = state.products.len(),
                        categories = state.categories.len(),
                        "Restored knowledge snapshot"
                    );
                    state
                }
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Snapshot is unreadable, starting with an empty store"
                    );
                    StoreState::default()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "No snapshot yet, starting empty");
                StoreState::default()
            }
            Err(e) => return Err(e.into()),
        };

        Ok(Self {
            path: Some(path),
            state: RwLock::new(state),
        })
    }

    /// Create a store that never touches disk (useful for testing).
    pub fn in_memory() -> Self {
        Self {
            path: None,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Snapshot file backing this store, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist(&self, state: &StoreState) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot = SnapshotRef {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            products: &state.products,
            categories: &state.categories,
            product_index: &state.product_index,
            category_index: &state.category_index,
        };
        let json = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(path);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, path)?;

        debug!(path = %path.display(), "Snapshot written");
        Ok(())
    }
}

impl StoreState {
    fn from_snapshot(products: Vec<Product>, categories: Vec<Category>) -> Self {
        let mut state = Self::default();
        state.add_products(&products);
        state.set_categories(categories);
        state
    }

    fn add_products(&mut self, products: &[Product]) -> usize {
        let mut added = 0;
        for product in products {
            if product.id.is_empty() || self.product_index.contains_key(&product.id) {
                continue;
            }
            self.product_index
                .insert(product.id.clone(), self.products.len());
            self.products.push(product.clone());
            added += 1;
        }
        added
    }

    fn set_categories(&mut self, categories: Vec<Category>) {
        self.category_index.clear();
        for (pos, category) in categories.iter().enumerate() {
            self.category_index
                .insert(category.name.to_lowercase(), pos);
            self.category_index.insert(category.id.to_string(), pos);
        }
        self.categories = categories;
    }
}

impl KnowledgeStore for SnapshotStore {
    fn store_products(&self, products: &[Product]) -> Result<usize, StoreError> {
        let mut state = self.write();
        let added = state.add_products(products);
        metrics::PRODUCTS_STORED.inc_by(added as u64);

        info!(
            added = added,
            offered = products.len(),
            total = state.products.len(),
            "Stored products"
        );
        self.persist(&state)?;
        Ok(added)
    }

    fn store_categories(&self, categories: &[Category]) -> Result<(), StoreError> {
        let mut state = self.write();
        state.set_categories(categories.to_vec());

        info!(categories = categories.len(), "Stored categories");
        self.persist(&state)
    }

    fn search(
        &self,
        term: &str,
        filters: &SearchFilters,
    ) -> Result<Vec<ScoredProduct>, StoreError> {
        let term = term.trim().to_lowercase();
        let state = self.read();

        let mut hits: Vec<ScoredProduct> = state
            .products
            .iter()
            .filter_map(|product| {
                let score = relevance(&term, product);
                (score > SCORE_THRESHOLD && passes_filters(product, filters)).then(|| {
                    ScoredProduct {
                        product: product.clone(),
                        score,
                    }
                })
            })
            .collect();

        // stable: equal scores keep ingestion order
        hits.sort_by(|a, b| b.score.cmp(&a.score));
        hits.truncate(SEARCH_LIMIT);

        let outcome = if hits.is_empty() { "miss" } else { "hit" };
        metrics::SEARCHES.with_label_values(&[outcome]).inc();
        debug!(
            term = %term,
            filtered = !filters.is_empty(),
            hits = hits.len(),
            "Store search"
        );

        Ok(hits)
    }

    fn get_category_info(&self, name_or_id: &str) -> Option<Category> {
        let key = name_or_id.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }

        let state = self.read();
        if let Some(&pos) = state.category_index.get(&key) {
            return state.categories.get(pos).cloned();
        }

        state
            .categories
            .iter()
            .find(|c| ratio(&key, &c.name.to_lowercase()) > CATEGORY_LOOKUP_THRESHOLD)
            .cloned()
    }

    fn get_product(&self, id: &str) -> Option<Product> {
        let state = self.read();
        state
            .product_index
            .get(id)
            .and_then(|&pos| state.products.get(pos))
            .cloned()
    }

    fn stats(&self) -> StoreStats {
        let state = self.read();
        StoreStats {
            total_products: state.products.len(),
            total_categories: state.categories.len(),
        }
    }
}

/// Score a product against a lowercased term. An empty term matches everything.
fn relevance(term: &str, product: &Product) -> u32 {
    if term.is_empty() {
        return 100;
    }

    let name = product.name.to_lowercase();
    let category = product.category.to_lowercase();

    let mut score = partial_ratio(term, &name).max(partial_ratio(term, &category));
    if name.contains(term) {
        score += SUBSTRING_BONUS;
    }
    score
}

fn passes_filters(product: &Product, filters: &SearchFilters) -> bool {
    if let Some(color) = &filters.color {
        let color = color.to_lowercase();
        if !product
            .colors
            .iter()
            .any(|c| ratio(&color, &c.to_lowercase()) > COLOR_THRESHOLD)
        {
            return false;
        }
    }

    if let Some(min) = filters.price_min {
        if !product.price.is_some_and(|p| p >= min) {
            return false;
        }
    }

    if let Some(max) = filters.price_max {
        if !product.price.is_some_and(|p| p <= max) {
            return false;
        }
    }

    if let Some(category) = &filters.category {
        if ratio(&category.to_lowercase(), &product.category.to_lowercase()) < CATEGORY_THRESHOLD {
            return false;
        }
    }

    true
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
