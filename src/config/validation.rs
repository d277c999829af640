use crate::config::types::{Config, CrawlerConfig, HttpConfig, NotifierConfig, StorageConfig};
use crate::ConfigError;
use reqwest::header::HeaderValue;
use url::Url;

const MAX_PAGES_CEILING: usize = 100_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_http_config(&config.http)?;
    validate_storage_config(&config.storage)?;
    validate_notifier_config(&config.notifier)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_http_url("start-url", &config.start_url)?;
    validate_http_url("base-url", &config.base_url)?;

    if config.interval_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "interval_secs must be >= 1, got {}",
            config.interval_secs
        )));
    }

    if config.max_pages < 1 || config.max_pages > MAX_PAGES_CEILING {
        return Err(ConfigError::Validation(format!(
            "max_pages must be between 1 and {}, got {}",
            MAX_PAGES_CEILING, config.max_pages
        )));
    }

    Ok(())
}

/// Validates outbound HTTP configuration
fn validate_http_config(config: &HttpConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    HeaderValue::from_str(&config.user_agent)
        .map_err(|e| ConfigError::InvalidHeader(format!("user_agent: {}", e)))?;

    if config.timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be >= 1, got {}",
            config.timeout_secs
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_notifier_config(config: &NotifierConfig) -> Result<(), ConfigError> {
    if config.channel_capacity < 1 {
        return Err(ConfigError::Validation(
            "channel_capacity must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates that a URL parses and uses an HTTP(S) scheme
fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, value
        )));
    }

    Ok(())
}
