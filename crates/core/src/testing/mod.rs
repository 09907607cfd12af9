//! Testing utilities and mock implementations.
//!
//! Mocks stand in for the two external collaborators (the target site and
//! the language-model interpreter) so crawls and answers can be tested
//! without network access.
//!
//! # Example
//!
//! ```rust,ignore
//! use brindes_core::testing::{MockFetcher, MockInterpreter, fixtures};
//!
//! let fetcher = MockFetcher::new();
//! fetcher.set_fallback(fixtures::listing_page(1, 10)).await;
//!
//! let interpreter = MockInterpreter::new();
//! interpreter.fail_next("model offline").await;
//! ```

mod mock_fetcher;
mod mock_interpreter;

pub use mock_fetcher::MockFetcher;
pub use mock_interpreter::MockInterpreter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::collections::BTreeSet;

    use crate::knowledge::Product;

    /// Create a test product with reasonable defaults.
    pub fn product(id: &str, name: &str, category: &str) -> Product {
        Product {
            id: id.to_string(),
            name: name.to_string(),
            category: category.to_string(),
            category_id: None,
            subcategory: None,
            subcategory_id: None,
            price: None,
            colors: BTreeSet::new(),
            url: format!("https://www.signa.pt/brindes/brinde.asp?id={}", id),
            description: None,
            reference: None,
        }
    }

    /// One listing `<li>` in the site's markup.
    pub fn listing_item(id: u32, name: &str, price: &str) -> String {
        format!(
            r#"<li class="produto">
  <a href="/brindes/brinde.asp?id={id}"><img src="/fotos/{id}.jpg"></a>
  <a href="/brindes/brinde.asp?id={id}">{name}</a>
  <span class="ref">BR{id:04}</span>
  <span class="preco">Desde {price} €</span>
</li>"#
        )
    }

    /// A listing page with `count` products, ids starting at `first_id`.
    pub fn listing_page(first_id: u32, count: u32) -> String {
        let items: String = (first_id..first_id + count)
            .map(|id| listing_item(id, &format!("Brinde {}", id), "1,50"))
            .collect();
        format!(
            "<html><body><div id=\"produtos\"><ul>{}</ul></div></body></html>",
            items
        )
    }
}
