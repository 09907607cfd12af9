use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Target site configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    /// Site root, without trailing slash (e.g., "https://www.signa.pt")
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

/// Root of the production site.
pub const DEFAULT_BASE_URL: &str = "https://www.signa.pt";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Crawl behaviour and budget
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlerConfig {
    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Politeness limit; 0 disables limiting
    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,
    /// Products kept per subcategory page (default: 30)
    #[serde(default = "default_subcategory_limit")]
    pub subcategory_limit: usize,
    /// Products kept per category page without subcategories (default: 50)
    #[serde(default = "default_category_limit")]
    pub category_limit: usize,
    /// Global ceiling for one crawl (default: 500)
    #[serde(default = "default_total_limit")]
    pub total_limit: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            requests_per_minute: default_requests_per_minute(),
            subcategory_limit: default_subcategory_limit(),
            category_limit: default_category_limit(),
            total_limit: default_total_limit(),
        }
    }
}

fn default_timeout() -> u32 {
    30
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string()
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_subcategory_limit() -> usize {
    30
}

fn default_category_limit() -> usize {
    50
}

fn default_total_limit() -> usize {
    500
}

/// Knowledge store persistence
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("brindes-snapshot.json")
}

/// Category/color table source
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Optional TOML table replacing the embedded one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.site.base_url, "https://www.signa.pt");
        assert_eq!(config.crawler.timeout_secs, 30);
        assert_eq!(config.crawler.subcategory_limit, 30);
        assert_eq!(config.crawler.category_limit, 50);
        assert_eq!(config.crawler.total_limit, 500);
        assert_eq!(
            config.store.snapshot_path.to_str().unwrap(),
            "brindes-snapshot.json"
        );
        assert!(config.catalog.path.is_none());
    }

    #[test]
    fn test_deserialize_partial_crawler_section() {
        let toml = r#"
[crawler]
total_limit = 100
requests_per_minute = 0
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.crawler.total_limit, 100);
        assert_eq!(config.crawler.requests_per_minute, 0);
        // untouched keys keep defaults
        assert_eq!(config.crawler.subcategory_limit, 30);
        assert!(config.crawler.user_agent.starts_with("Mozilla/5.0"));
    }

    #[test]
    fn test_deserialize_custom_paths() {
        let toml = r#"
[store]
snapshot_path = "/data/kb.json"

[catalog]
path = "/etc/brindes/catalog.toml"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.store.snapshot_path.to_str().unwrap(), "/data/kb.json");
        assert_eq!(
            config.catalog.path.as_ref().unwrap().to_str().unwrap(),
            "/etc/brindes/catalog.toml"
        );
    }

    #[test]
    fn test_deserialize_site_override() {
        let toml = r#"
[site]
base_url = "http://localhost:8000"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.site.base_url, "http://localhost:8000");
    }
}
