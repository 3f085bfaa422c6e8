//! Configuration validation with aggregated errors.
//! - Aggregates all issues into one `ConfigError`
//! - Checks credentials presence and endpoint URL shape
//! - Checks cache, retry and logging invariants

use reqwest::Url;
use tracing::{error, info};

use crate::config::credentials::Credentials;
use crate::config::settings::{CacheConfig, RetryConfig, ServiceConfig, SettingsConfig};
use crate::errors::ConfigError;
use crate::observability::metrics::get_metrics;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or a `ConfigError` containing all issues.
pub async fn validate_service_config(cfg: &ServiceConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_settings(&cfg.settings, &mut errors);
    validate_credentials(&cfg.credentials, &mut errors);

    if errors.is_empty() {
        info!("config is valid");
        return Ok(());
    }

    error!("config is not valid, total errors: {}", errors.len());
    for e in &errors {
        error!(" - {}", e);
    }
    get_metrics().await.config_validation_errors.inc();
    Err(ConfigError(errors))
}

/// SETTINGS VALIDATION
fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    validate_cache("settings.cache", &settings.cache, errors);

    if let Some(retry) = &settings.retry {
        validate_retry("settings.retry", retry, errors);
    }

    if settings.http.timeout_ms == Some(0) {
        errors.push("settings.http.timeout_ms must be > 0 or null".to_owned());
    }

    if let Some(logging) = &settings.logging {
        if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
            errors.push(format!(
                "settings.logging.level '{}' invalid; allowed: {:?}",
                logging.level, LOG_LEVELS
            ));
        }
    }
}

fn validate_cache(path: &str, cache: &CacheConfig, errors: &mut Vec<String>) {
    if cache.buffer_seconds >= cache.default_expires_in_seconds {
        errors.push(format!(
            "{}.buffer_seconds ({}) must be < default_expires_in_seconds ({}), otherwise tokens without expires_in are never reused",
            path, cache.buffer_seconds, cache.default_expires_in_seconds
        ));
    }
}

fn validate_retry(path: &str, retry: &RetryConfig, errors: &mut Vec<String>) {
    if let Some(attempts) = retry.attempts {
        if attempts == 0 {
            errors.push(format!("{}.attempts must be > 0", path));
        }
    }
    if let (Some(base), Some(max)) = (retry.base_delay_ms, retry.max_delay_ms) {
        if max < base {
            errors.push(format!(
                "{}.max_delay_ms ({}) must be >= base_delay_ms ({})",
                path, max, base
            ));
        }
    }
}

/// CREDENTIALS
fn validate_credentials(credentials: &Credentials, errors: &mut Vec<String>) {
    for field in credentials.missing_fields() {
        errors.push(format!("credentials.{} is required", field));
    }

    if let Some(endpoint) = credentials.token_endpoint.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        match Url::parse(endpoint) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            Ok(url) => errors.push(format!(
                "credentials.token_endpoint '{}' must use http or https, got '{}'",
                endpoint,
                url.scheme()
            )),
            Err(e) => errors.push(format!(
                "credentials.token_endpoint '{}' is not a valid URL: {}",
                endpoint, e
            )),
        }
    }
}
