mod commands;
mod metrics;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use brindes_core::{
    load_config, validate_config, CatalogAssistant, CategoryCatalog, Config, ConfigError, Crawler,
    HttpFetcher, KnowledgeStore, PageFetcher, PassthroughInterpreter, SearchQuery, SnapshotStore,
};

use commands::{join_words, Cli, Commands};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Logs go to stderr; stdout carries command output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config_path = std::env::var("BRINDES_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));
    let config = load_settings(&config_path)?;
    validate_config(&config).context("Configuration validation failed")?;

    let catalog = Arc::new(match &config.catalog.path {
        Some(path) => CategoryCatalog::from_path(path)
            .with_context(|| format!("Failed to load category catalog from {:?}", path))?,
        None => CategoryCatalog::embedded().context("Failed to load embedded catalog")?,
    });
    info!(
        version = catalog.version(),
        categories = catalog.all_categories().len(),
        "Category catalog loaded"
    );

    let store = Arc::new(
        SnapshotStore::open(&config.store.snapshot_path).with_context(|| {
            format!(
                "Failed to open knowledge store at {:?}",
                config.store.snapshot_path
            )
        })?,
    );
    info!(
        path = ?store.path(),
        products = store.stats().total_products,
        "Knowledge store ready"
    );
    let store_dyn: Arc<dyn KnowledgeStore> = Arc::clone(&store) as Arc<dyn KnowledgeStore>;

    let fetcher: Arc<dyn PageFetcher> =
        Arc::new(HttpFetcher::new(&config.crawler).context("Failed to create HTTP fetcher")?);
    let crawler = Crawler::new(
        fetcher,
        Arc::clone(&store_dyn),
        Arc::clone(&catalog),
        &config,
    );
    let base_url = config.site.base_url.clone();

    match cli.command {
        Commands::Crawl => {
            let stats = crawler.crawl_and_index(&base_url).await;
            print_json(&stats)?;
        }
        Commands::Update { category } => {
            let category = join_words(&category);
            let update = crawler
                .update_category(&category)
                .await
                .with_context(|| format!("Failed to update category '{}'", category))?;
            print_json(&update)?;
        }
        Commands::Search { term } => {
            ensure_indexed(&crawler, store_dyn.as_ref(), &base_url).await;
            let assistant = CatalogAssistant::new(
                Arc::clone(&store_dyn),
                Arc::new(PassthroughInterpreter::new()),
                Arc::clone(&catalog),
                &base_url,
            );
            print_json(&assistant.search_products(&SearchQuery::new(join_words(&term))))?;
        }
        Commands::Ask { message } => {
            ensure_indexed(&crawler, store_dyn.as_ref(), &base_url).await;
            let assistant = CatalogAssistant::new(
                Arc::clone(&store_dyn),
                Arc::new(PassthroughInterpreter::new()),
                Arc::clone(&catalog),
                &base_url,
            );
            print_json(&assistant.answer(&join_words(&message)).await)?;
        }
        Commands::Stats => print_json(&store.stats())?,
    }

    if cli.metrics {
        metrics::collect_store_metrics(store_dyn.as_ref());
        print!("{}", metrics::encode_metrics()?);
    }

    Ok(())
}

/// Load the config file, falling back to defaults when it does not exist.
fn load_settings(path: &Path) -> Result<Config> {
    match load_config(path) {
        Ok(config) => {
            info!("Configuration loaded from {:?}", path);
            Ok(config)
        }
        Err(ConfigError::FileNotFound(_)) => {
            info!("No config file at {:?}, using defaults", path);
            Ok(Config::default())
        }
        Err(e) => Err(e).with_context(|| format!("Failed to load config from {:?}", path)),
    }
}

/// Crawl first when the store has never been populated.
async fn ensure_indexed(crawler: &Crawler, store: &dyn KnowledgeStore, base_url: &str) {
    if store.stats().total_products == 0 {
        info!("Knowledge store is empty, crawling before answering");
        crawler.crawl_and_index(base_url).await;
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", output);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_settings(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.site.base_url, brindes_core::DEFAULT_BASE_URL);
    }

    #[test]
    fn test_config_file_is_read() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[crawler]\ntotal_limit = 42").unwrap();

        let config = load_settings(file.path()).unwrap();
        assert_eq!(config.crawler.total_limit, 42);
    }

    #[test]
    fn test_invalid_config_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[crawler]\ntotal_limit = \"lots\"").unwrap();

        assert!(load_settings(file.path()).is_err());
    }
}
