use http::StatusCode;
use thiserror::Error;

use crate::cache::cache_key::TokenKind;
use crate::sinks::chain_result::{CacheStatistics, StepReport};

/// Why a single chain step (or the chain as a whole) could not produce a token.
#[derive(Debug, Error)]
pub enum ChainError {
    /// Required credential fields absent; raised before any network call.
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network failure at step '{step}': {source}")]
    Network {
        step: TokenKind,
        #[source]
        source: reqwest::Error,
    },

    /// Non-2xx answer, or a 2xx answer without a usable `access_token`.
    #[error("token exchange failed at step '{step}' (status {}): {body}", status_label(.status))]
    TokenExchange {
        step: TokenKind,
        status: Option<StatusCode>,
        body: String,
    },
}

impl ChainError {
    pub fn step(&self) -> Option<TokenKind> {
        match self {
            ChainError::Configuration(_) => None,
            ChainError::Network { step, .. } | ChainError::TokenExchange { step, .. } => Some(*step),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ChainError::TokenExchange { status, .. } => *status,
            _ => None,
        }
    }

    /// Transport failures, 5xx and 429 may succeed on a later attempt; anything else will not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ChainError::Configuration(_) => false,
            ChainError::Network { .. } => true,
            ChainError::TokenExchange { status: None, .. } => false,
            ChainError::TokenExchange { status: Some(status), .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
        }
    }

    /// Short label used as a metrics dimension.
    pub fn reason(&self) -> &'static str {
        match self {
            ChainError::Configuration(_) => "configuration",
            ChainError::Network { .. } => "network",
            ChainError::TokenExchange { .. } => "token_exchange",
        }
    }
}

fn status_label(status: &Option<StatusCode>) -> String {
    status
        .map(|s| s.as_u16().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

/// A failed chain run: the error plus everything known at the point it aborted.
#[derive(Debug, Error)]
#[error("token chain aborted after {} completed step(s): {error}", .completed_steps.len())]
pub struct ChainFailure {
    #[source]
    pub error: ChainError,
    pub completed_steps: Vec<StepReport>,
    pub cache_statistics: CacheStatistics,
}

impl ChainFailure {
    pub fn new(error: ChainError, completed_steps: Vec<StepReport>, cache_statistics: CacheStatistics) -> Self {
        Self { error, completed_steps, cache_statistics }
    }

    /// The step that failed; `None` for configuration errors.
    pub fn failed_step(&self) -> Option<TokenKind> {
        self.error.step()
    }

    pub fn is_retryable(&self) -> bool {
        self.error.is_retryable()
    }
}

/// Every problem found while validating a service configuration.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid configuration: {}", .0.join("; "))]
pub struct ConfigError(pub Vec<String>);
