//! Token endpoint client
//!
//! One form-encoded POST per call, parsed into a `TokenResponse`. No retries,
//! no caching: both belong to the caller.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::cache_key::{TokenKind, TokenRequestParams};
use crate::errors::ChainError;

/// Parsed token endpoint answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    /// `None` when the endpoint did not say.
    pub expires_in_seconds: Option<u64>,
    pub token_type: Option<String>,
}

pub trait FetchToken {
    fn fetch(
        &self,
        step: TokenKind,
        endpoint: &str,
        params: &TokenRequestParams,
    ) -> impl std::future::Future<Output = Result<TokenResponse, ChainError>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct HttpTokenFetcher {
    client: Client,
}

impl HttpTokenFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build with a per-request timeout; `None` keeps reqwest's default (no timeout).
    pub fn with_timeout(timeout_ms: Option<u64>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout_ms) = timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        Ok(Self { client: builder.build()? })
    }
}

impl FetchToken for HttpTokenFetcher {
    async fn fetch(
        &self,
        step: TokenKind,
        endpoint: &str,
        params: &TokenRequestParams,
    ) -> Result<TokenResponse, ChainError> {
        debug!(step = %step, params = ?params, "posting token request");

        // `form` sets Content-Type: application/x-www-form-urlencoded
        let response = self
            .client
            .post(endpoint)
            .form(params)
            .send()
            .await
            .map_err(|source| ChainError::Network { step, source })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|source| ChainError::Network { step, source })?;

        if !status.is_success() {
            return Err(ChainError::TokenExchange { step, status: Some(status), body });
        }
        parse_token_response(step, status, &body)
    }
}

/// Extract `access_token` / `expires_in` / `token_type` from a 2xx body.
pub fn parse_token_response(step: TokenKind, status: StatusCode, body: &str) -> Result<TokenResponse, ChainError> {
    let json: Value = serde_json::from_str(body).map_err(|e| ChainError::TokenExchange {
        step,
        status: Some(status),
        body: format!("response is not valid JSON ({}): {}", e, body),
    })?;

    let access_token = json
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ChainError::TokenExchange {
            step,
            status: Some(status),
            body: format!("response has no access_token: {}", body),
        })?
        .to_owned();

    let expires_in_seconds = match json.get("expires_in") {
        None | Some(Value::Null) => None,
        Some(value) => {
            let parsed = parse_expires_in(value);
            if parsed.is_none() {
                warn!(step = %step, expires_in = %value, "unusable expires_in, falling back to default lifetime");
            }
            parsed
        }
    };

    let token_type = json.get("token_type").and_then(Value::as_str).map(str::to_owned);

    Ok(TokenResponse { access_token, expires_in_seconds, token_type })
}

/// Some issuers send `expires_in` as a numeric string. Negative values clamp
/// to 0: the token is already stale.
fn parse_expires_in(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_i64().map(|i| i.max(0) as u64))
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.max(0.0) as u64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<u64>()
                .ok()
                .or_else(|| s.parse::<i64>().ok().map(|i| i.max(0) as u64))
        }
        _ => None,
    }
}
