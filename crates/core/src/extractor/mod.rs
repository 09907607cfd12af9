//! Product extraction from listing pages.
//!
//! Listing pages are scanned for `<li>` items that link to a product detail
//! page (`/brindes/brinde.asp?id=<n>`). Parsing is tolerant: an
//! item that cannot be turned into a product is skipped and the rest of the
//! page still processes.

mod types;

pub use types::*;

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex_lite::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::metrics;

/// Path of the product detail page on the target site.
pub const DETAIL_PATH: &str = "/brindes/brinde.asp";

static PRODUCT_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/brindes/brinde\.asp\?id=(\d+)").unwrap());

/// Price patterns in priority order.
static PRICE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"Desde\s+(\d+[.,]\d+)\s*€",
        r"(\d+[.,]\d+)\s*€",
        r"€\s*(\d+[.,]\d+)",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static REFERENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{2,}[0-9]{3,}").unwrap());

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("li").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static COLOR_SWATCH: Lazy<Selector> =
    Lazy::new(|| Selector::parse(".color, .color-option").unwrap());

/// Extracts product records from listing HTML.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    base_url: String,
}

impl ProductExtractor {
    /// Create an extractor that builds detail URLs under `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Extract every product on the page, in document order.
    ///
    /// Items whose id was already seen on the page are dropped.
    pub fn extract_products(&self, html: &str) -> Vec<ProductRecord> {
        let document = Html::parse_document(html);
        let mut products = Vec::new();
        let mut seen = HashSet::new();

        for item in document.select(&LIST_ITEM) {
            if !has_product_link(&item) || is_container(&item) {
                continue;
            }

            match self.extract_item(&item) {
                Ok(product) => {
                    if seen.insert(product.id.clone()) {
                        products.push(product);
                    }
                }
                Err(e) => {
                    metrics::EXTRACTION_REJECTS.inc();
                    debug!(error = %e, "Skipping listing item");
                }
            }
        }

        metrics::PRODUCTS_EXTRACTED.inc_by(products.len() as u64);
        debug!(products = products.len(), "Extracted products from page");
        products
    }

    fn extract_item(&self, item: &ElementRef) -> Result<ProductRecord, ExtractionError> {
        let links: Vec<ElementRef> = item
            .select(&LINK)
            .filter(|a| a.value().attr("href").is_some_and(|h| PRODUCT_LINK.is_match(h)))
            .collect();

        let id = links
            .first()
            .and_then(|a| a.value().attr("href"))
            .and_then(|href| PRODUCT_LINK.captures(href))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
            .ok_or(ExtractionError::MissingId)?;

        let name = links
            .iter()
            .map(|a| normalize_whitespace(&a.text().collect::<Vec<_>>().join(" ")))
            .find(|text| !text.is_empty() && !text.starts_with("http"))
            .ok_or_else(|| ExtractionError::MissingName(id.clone()))?;

        let text = item_text(item);

        Ok(ProductRecord {
            url: format!("{}{}?id={}", self.base_url, DETAIL_PATH, id),
            price: parse_price(&text),
            reference: REFERENCE.find(&text).map(|m| m.as_str().to_string()),
            colors: extract_colors(item),
            id,
            name,
        })
    }
}

/// Extract products from a page of the default site.
pub fn extract_products(html: &str) -> Vec<ProductRecord> {
    extract_products_with_base(html, crate::config::DEFAULT_BASE_URL)
}

/// Extract products, building detail URLs under `base_url`.
pub fn extract_products_with_base(html: &str, base_url: &str) -> Vec<ProductRecord> {
    ProductExtractor::new(base_url).extract_products(html)
}

/// Parse the first price found in `text`, trying each pattern in order.
pub fn parse_price(text: &str) -> Option<f64> {
    PRICE_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().replace(',', ".").parse::<f64>().ok())
    })
}

fn has_product_link(item: &ElementRef) -> bool {
    item.select(&LINK)
        .any(|a| a.value().attr("href").is_some_and(|h| PRODUCT_LINK.is_match(h)))
}

/// A list item wrapping other product items (e.g., a grid inside a menu).
fn is_container(item: &ElementRef) -> bool {
    item.select(&LIST_ITEM).any(|inner| has_product_link(&inner))
}

fn item_text(item: &ElementRef) -> String {
    item.text()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{a0}', " ")
}

fn extract_colors(item: &ElementRef) -> Vec<String> {
    let mut colors: Vec<String> = Vec::new();
    for swatch in item.select(&COLOR_SWATCH) {
        let label = swatch
            .value()
            .attr("title")
            .map(normalize_whitespace)
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| normalize_whitespace(&swatch.text().collect::<String>()));
        if !label.is_empty() && !colors.contains(&label) {
            colors.push(label);
        }
    }
    colors
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.signa.pt";

    fn extractor() -> ProductExtractor {
        ProductExtractor::new(BASE)
    }

    #[test]
    fn test_extracts_single_product() {
        let html = r#"
            <html><body><ul>
              <li class="produto">
                <a href="/brindes/brinde.asp?id=4521"><img src="caneca.jpg"></a>
                <a href="/brindes/brinde.asp?id=4521">Caneca Térmica Azul</a>
                <span class="ref">CT4521</span>
                <span class="preco">Desde 5,90 €</span>
              </li>
            </ul></body></html>
        "#;

        let products = extractor().extract_products(html);
        assert_eq!(products.len(), 1);

        let product = &products[0];
        assert_eq!(product.id, "4521");
        assert_eq!(product.name, "Caneca Térmica Azul");
        assert!((product.price.unwrap() - 5.90).abs() < 1e-9);
        assert_eq!(product.reference.as_deref(), Some("CT4521"));
        assert_eq!(product.url, "https://www.signa.pt/brindes/brinde.asp?id=4521");
    }

    #[test]
    fn test_item_without_name_is_skipped() {
        let html = r#"
            <ul>
              <li><a href="/brindes/brinde.asp?id=1"><img src="a.jpg"></a></li>
              <li><a href="/brindes/brinde.asp?id=2">Mochila</a></li>
            </ul>
        "#;

        let products = extractor().extract_products(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "2");
    }

    #[test]
    fn test_url_like_anchor_text_is_not_a_name() {
        let html = r#"
            <ul><li>
              <a href="/brindes/brinde.asp?id=7">https://www.signa.pt/brindes/brinde.asp?id=7</a>
              <a href="/brindes/brinde.asp?id=7">Porta-Chaves Metal</a>
            </li></ul>
        "#;

        let products = extractor().extract_products(html);
        assert_eq!(products[0].name, "Porta-Chaves Metal");
    }

    #[test]
    fn test_items_without_product_links_are_ignored() {
        let html = r#"
            <ul>
              <li><a href="/brindes/categoria.asp?idCategoria=30">Casa &amp; Lar</a></li>
              <li>Texto solto 3,50 €</li>
            </ul>
        "#;

        assert!(extractor().extract_products(html).is_empty());
    }

    #[test]
    fn test_missing_price_stays_none() {
        let html = r#"<ul><li><a href="/brindes/brinde.asp?id=9">Lápis</a> sob consulta</li></ul>"#;
        let products = extractor().extract_products(html);
        assert_eq!(products[0].price, None);
        assert_eq!(products[0].reference, None);
    }

    #[test]
    fn test_price_pattern_priority() {
        // "Desde" wins over an earlier plain price
        assert_eq!(parse_price("Antes 9,99 € Desde 4,50 €"), Some(4.50));
        assert_eq!(parse_price("Preço 12.30 €"), Some(12.30));
        assert_eq!(parse_price("€ 7,25 / unid."), Some(7.25));
        assert_eq!(parse_price("sem preço"), None);
        // integers without decimals are not prices on this site
        assert_eq!(parse_price("5 €"), None);
    }

    #[test]
    fn test_non_breaking_space_before_euro() {
        let html = "<ul><li><a href=\"/brindes/brinde.asp?id=3\">Copo</a> 1,20\u{a0}€</li></ul>";
        let products = extractor().extract_products(html);
        assert_eq!(products[0].price, Some(1.20));
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let html = r#"
            <ul>
              <li><a href="/brindes/brinde.asp?id=5">Primeiro</a></li>
              <li><a href="/brindes/brinde.asp?id=5">Segundo</a></li>
            </ul>
        "#;
        let products = extractor().extract_products(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Primeiro");
    }

    #[test]
    fn test_container_items_are_skipped() {
        let html = r#"
            <ul><li class="grid">
              <ul>
                <li><a href="/brindes/brinde.asp?id=11">Caneta A</a> 0,40 €</li>
                <li><a href="/brindes/brinde.asp?id=12">Caneta B</a> 0,55 €</li>
              </ul>
            </li></ul>
        "#;
        let products = extractor().extract_products(html);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, Some(0.40));
        assert_eq!(products[1].price, Some(0.55));
    }

    #[test]
    fn test_colors_from_swatches() {
        let html = r#"
            <ul><li>
              <a href="/brindes/brinde.asp?id=20">T-Shirt Básica</a>
              <span class="color" title="Azul"></span>
              <span class="color" title="Branco"></span>
              <div class="color-option">Preto</div>
              <span class="color" title="Azul"></span>
            </li></ul>
        "#;
        let products = extractor().extract_products(html);
        assert_eq!(products[0].colors, vec!["Azul", "Branco", "Preto"]);
    }

    #[test]
    fn test_malformed_html_is_tolerated() {
        let html = r#"<ul><li><a href="/brindes/brinde.asp?id=30">Boné <b>Verde</a> 2,00 €<li>"#;
        let products = extractor().extract_products(html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, "30");
    }

    #[test]
    fn test_free_function_uses_default_site() {
        let products = extract_products(r#"<li><a href="/brindes/brinde.asp?id=8">Saco</a></li>"#);
        assert_eq!(products[0].url, "https://www.signa.pt/brindes/brinde.asp?id=8");
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let extractor = ProductExtractor::new("http://localhost:8000/");
        let products =
            extractor.extract_products(r#"<li><a href="/brindes/brinde.asp?id=1">X</a></li>"#);
        assert_eq!(products[0].url, "http://localhost:8000/brindes/brinde.asp?id=1");
    }
}
