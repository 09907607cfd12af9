use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - base_url is an http(s) URL
/// - timeout is not 0
/// - crawl limits are not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let base_url = config.site.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::ValidationError(format!(
            "site.base_url must be an http(s) URL, got {:?}",
            config.site.base_url
        )));
    }

    if config.crawler.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "crawler.timeout_secs cannot be 0".to_string(),
        ));
    }

    let limits = [
        ("crawler.subcategory_limit", config.crawler.subcategory_limit),
        ("crawler.category_limit", config.crawler.category_limit),
        ("crawler.total_limit", config.crawler.total_limit),
    ];
    for (name, value) in limits {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!("{} cannot be 0", name)));
        }
    }

    Ok(())
}
