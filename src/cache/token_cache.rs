use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::cache_key::{CacheKey, TokenKind, TokenRequestParams};
use crate::cache::token::CachedToken;
use crate::helpers::time::{Clock, SystemClock};
use crate::utils::constants::DEFAULT_BUFFER_SECONDS;

/// Expiring token store keyed by (kind, request parameters).
///
/// Cloning yields another handle to the same entries. Expired entries are
/// only removed when a `get` finds them.
#[derive(Debug, Clone)]
pub struct TokenCache {
    inner: Arc<RwLock<HashMap<CacheKey, CachedToken>>>,
    clock: Arc<dyn Clock>,
    buffer_seconds: u64,
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock), DEFAULT_BUFFER_SECONDS)
    }

    pub fn with_clock(clock: Arc<dyn Clock>, buffer_seconds: u64) -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            clock,
            buffer_seconds,
        }
    }

    pub fn with_buffer_seconds(buffer_seconds: u64) -> Self {
        Self::with_clock(Arc::new(SystemClock), buffer_seconds)
    }

    pub fn buffer_seconds(&self) -> u64 {
        self.buffer_seconds
    }

    /// Get token if it exists and is not expired. An expired entry is evicted.
    pub async fn get(&self, kind: TokenKind, params: &TokenRequestParams) -> Option<String> {
        let key = CacheKey::new(kind, params);
        let now = self.clock.now_millis();
        {
            let map = self.inner.read().await;
            match map.get(&key) {
                None => return None,
                Some(entry) if !entry.is_expired_at(now) => return Some(entry.token.clone()),
                Some(_) => {}
            }
        }

        // re-check under the write lock, a concurrent set may have refreshed it
        let mut map = self.inner.write().await;
        if map.get(&key).is_some_and(|entry| entry.is_expired_at(now)) {
            map.remove(&key);
            debug!(kind = %kind, "evicted expired token");
            return None;
        }
        map.get(&key).map(|entry| entry.token.clone())
    }

    /// Store `token`, treating it as expired `buffer_seconds` before `expires_in_seconds` runs out.
    pub async fn set(
        &self,
        kind: TokenKind,
        params: &TokenRequestParams,
        token: String,
        expires_in_seconds: u64,
    ) {
        // saturate: expires_in comes from the server and may be absurdly large
        let lifetime_secs = i64::try_from(expires_in_seconds)
            .unwrap_or(i64::MAX)
            .saturating_sub(i64::try_from(self.buffer_seconds).unwrap_or(i64::MAX));
        let expires_at_millis = self.clock.now_millis().saturating_add(lifetime_secs.saturating_mul(1000));
        let mut map = self.inner.write().await;
        map.insert(CacheKey::new(kind, params), CachedToken::new(token, expires_at_millis));
        debug!(kind = %kind, expires_at_millis, "token cached");
    }

    /// Remove every entry.
    pub async fn clear(&self) {
        self.inner.write().await.clear();
    }

    /// Stored entries, including expired ones not yet evicted.
    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
