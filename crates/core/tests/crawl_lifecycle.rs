//! Crawl lifecycle integration tests.
//!
//! These tests run the full pipeline against a mock site:
//! - Crawl caps against the embedded catalog
//! - Snapshot persistence across restarts
//! - Search and assistant answers over crawled data

use std::sync::Arc;

use tempfile::TempDir;

use brindes_core::{
    testing::{fixtures, MockFetcher, MockInterpreter},
    CatalogAssistant, CategoryCatalog, Config, Crawler, InterpretedQuery, KnowledgeStore,
    PassthroughInterpreter, SearchFilters, SearchQuery, SnapshotStore,
};

const BASE: &str = "https://www.signa.pt";

/// Test helper wiring a crawler and store over a mock site.
struct TestHarness {
    crawler: Crawler,
    store: Arc<SnapshotStore>,
    fetcher: Arc<MockFetcher>,
    catalog: Arc<CategoryCatalog>,
    temp_dir: TempDir,
}

impl TestHarness {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let store = Arc::new(
            SnapshotStore::open(temp_dir.path().join("snapshot.json"))
                .expect("Failed to open store"),
        );
        let fetcher = Arc::new(MockFetcher::new());
        let catalog = Arc::new(CategoryCatalog::embedded().expect("Embedded catalog"));

        let crawler = Crawler::new(
            Arc::clone(&fetcher) as Arc<dyn brindes_core::PageFetcher>,
            Arc::clone(&store) as Arc<dyn KnowledgeStore>,
            Arc::clone(&catalog),
            &Config::default(),
        );

        Self {
            crawler,
            store,
            fetcher,
            catalog,
            temp_dir,
        }
    }

    fn reopen_store(&self) -> SnapshotStore {
        SnapshotStore::open(self.temp_dir.path().join("snapshot.json"))
            .expect("Failed to reopen store")
    }
}

#[tokio::test]
async fn test_full_crawl_stops_at_global_cap() {
    let harness = TestHarness::new();
    harness
        .fetcher
        .set_fallback(fixtures::listing_page(1, 40))
        .await;

    let stats = harness.crawler.crawl_and_index(BASE).await;

    // every category in the table has subcategories: 30 per page,
    // and the 17th page takes the total past 500
    assert_eq!(stats.products_crawled, 510);
    assert_eq!(stats.pages_fetched, 17);
    assert_eq!(harness.fetcher.request_count().await, 17);
    assert_eq!(stats.categories_crawled, harness.catalog.all_categories().len());

    // the same 30 ids on every page collapse to 30 products
    assert_eq!(harness.store.stats().total_products, 30);

    let first = &harness.fetcher.requested_urls().await[0];
    assert_eq!(
        first,
        "https://www.signa.pt/brindes/categoria.asp?idCategoria=44&idSubCategoria=359"
    );
}

#[tokio::test]
async fn test_snapshot_survives_restart() {
    let harness = TestHarness::new();
    harness
        .fetcher
        .set_fallback(fixtures::listing_page(1, 5))
        .await;
    harness.crawler.crawl_and_index(BASE).await;

    let restored = harness.reopen_store();
    assert_eq!(restored.stats(), harness.store.stats());
    assert_eq!(
        restored.get_category_info("Vestuario").map(|c| c.id),
        Some(31)
    );
    assert_eq!(restored.get_product("3").unwrap().name, "Brinde 3");
}

#[tokio::test]
async fn test_extraction_end_to_end() {
    let harness = TestHarness::new();
    let page = r#"
        <html><body><ul>
          <li class="produto">
            <a href="/brindes/brinde.asp?id=4521"><img src="caneca.jpg"></a>
            <a href="/brindes/brinde.asp?id=4521">Caneca Térmica Azul</a>
            <span class="ref">CT4521</span>
            <span class="preco">Desde 5,90 €</span>
          </li>
        </ul></body></html>
    "#;
    harness
        .fetcher
        .set_page(
            format!("{}/brindes/categoria.asp?idCategoria=30&idSubCategoria=164", BASE),
            page,
        )
        .await;

    harness.crawler.crawl_and_index(BASE).await;

    let hits = harness
        .store
        .search("caneca térmica", &SearchFilters::default())
        .unwrap();
    assert_eq!(hits.len(), 1);

    let product = &hits[0].product;
    assert_eq!(product.id, "4521");
    assert_eq!(product.name, "Caneca Térmica Azul");
    assert_eq!(product.price, Some(5.9));
    assert_eq!(product.reference.as_deref(), Some("CT4521"));
    assert_eq!(product.url, "https://www.signa.pt/brindes/brinde.asp?id=4521");
    assert_eq!(product.category, "Casa & Lar");
    assert_eq!(product.subcategory_id, Some(164));
}

#[tokio::test]
async fn test_assistant_over_crawled_store() {
    let harness = TestHarness::new();
    harness
        .fetcher
        .set_fallback(fixtures::listing_page(10, 3))
        .await;
    harness.crawler.crawl_and_index(BASE).await;

    let assistant = CatalogAssistant::new(
        Arc::clone(&harness.store) as Arc<dyn KnowledgeStore>,
        Arc::new(PassthroughInterpreter::new()),
        Arc::clone(&harness.catalog),
        BASE,
    );

    let result = assistant.search_products(&SearchQuery::new("brinde 11"));
    assert_eq!(result.products[0].id, "11");
    assert!(result.message.starts_with("Encontrei 3 produtos:"));

    let result = assistant.answer("brinde 11").await;
    assert_eq!(result.products[0].id, "11");
}

#[tokio::test]
async fn test_assistant_routes_keywords_to_filter_links() {
    let harness = TestHarness::new();

    let interpreter = MockInterpreter::new();
    interpreter
        .set_response(InterpretedQuery {
            product: Some("bonés".to_string()),
            color: Some("azul".to_string()),
            ..InterpretedQuery::product_search("tem bonés azuis?")
        })
        .await;

    let assistant = CatalogAssistant::new(
        Arc::clone(&harness.store) as Arc<dyn KnowledgeStore>,
        Arc::new(interpreter),
        Arc::clone(&harness.catalog),
        BASE,
    );

    let result = assistant.answer("tem bones azuis?").await;
    let filter_url = result.filter_url.expect("filter url");
    assert!(filter_url.starts_with("https://www.signa.pt/brindes/categoria.asp?q=&t="));
    assert!(filter_url.contains("&idCategoria=31&idSubCategoria=179&"));
    assert!(filter_url.contains("&idCorPrincipal=117&"));
    assert!(filter_url.ends_with("&prodPorPagina=25"));
    assert!(result.message.starts_with("Entendi que procura: tem bonés azuis?"));

    // no network access is needed for keyword routes
    assert_eq!(harness.fetcher.request_count().await, 0);
}
