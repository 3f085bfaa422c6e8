use serde::Deserialize;

use crate::config::credentials::Credentials;
use crate::utils::constants::{DEFAULT_BUFFER_SECONDS, DEFAULT_EXPIRES_IN_SECONDS, DEFAULT_HTTP_TIMEOUT_MS};

/// ================================
/// Full service configuration
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub settings: SettingsConfig,
    #[serde(default)]
    pub credentials: Credentials,
}

/// ================================
/// Global service-wide settings
/// ================================
#[derive(Debug, Deserialize, Clone, Default)]
pub struct SettingsConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub http: HttpConfig,
    pub retry: Option<RetryConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// subtracted from every token lifetime
    #[serde(default = "default_buffer_seconds")]
    pub buffer_seconds: u64,
    /// lifetime assumed when the endpoint omits `expires_in`
    #[serde(default = "default_expires_in_seconds")]
    pub default_expires_in_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            buffer_seconds: DEFAULT_BUFFER_SECONDS,
            default_expires_in_seconds: DEFAULT_EXPIRES_IN_SECONDS,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    /// per-request timeout, `null` disables it
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: Option<u64>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: default_timeout_ms() }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    pub attempts: Option<u32>,
    /// will be mutiply by 2 on every attempt until max_delay_ms
    pub base_delay_ms: Option<u64>,
    /// max delay for retrying
    /// invariant: >= base_delay_ms.
    pub max_delay_ms: Option<u64>,
}

/// ================================
/// Logging
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String, // allowed: trace, debug, info, warn, error
    pub format: LogFormat,
}

impl LoggingConfig {
    pub fn new(level: String, format: LogFormat) -> Self {
        Self { level, format }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_owned(), format: LogFormat::Compact }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Compact,
}

fn default_buffer_seconds() -> u64 {
    DEFAULT_BUFFER_SECONDS
}

fn default_expires_in_seconds() -> u64 {
    DEFAULT_EXPIRES_IN_SECONDS
}

fn default_timeout_ms() -> Option<u64> {
    Some(DEFAULT_HTTP_TIMEOUT_MS)
}
