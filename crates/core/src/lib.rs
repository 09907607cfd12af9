pub mod assistant;
pub mod catalog;
pub mod config;
pub mod crawler;
pub mod extractor;
pub mod fetcher;
pub mod filter_url;
pub mod knowledge;
pub mod metrics;
pub mod testing;

pub use assistant::{
    CatalogAssistant, InterpretedQuery, InterpreterError, PassthroughInterpreter, QueryInterpreter,
    QueryType, SearchQuery, SearchResult,
};
pub use catalog::{CatalogError, Category, CategoryCatalog, KeywordRoute, Subcategory};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, DEFAULT_BASE_URL,
};
pub use crawler::{CategoryUpdate, CrawlError, CrawlLimits, CrawlStats, Crawler};
pub use extractor::{
    extract_products, extract_products_with_base, ExtractionError, ProductExtractor, ProductRecord,
};
pub use fetcher::{FetchError, HttpFetcher, PageFetcher};
pub use filter_url::{FilterUrlBuilder, FilterUrlRequest};
pub use knowledge::{
    KnowledgeStore, Product, ScoredProduct, SearchFilters, SnapshotStore, StoreError, StoreStats,
};
