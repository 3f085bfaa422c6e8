//! # FIC Token Chain Library
//!
//! Obtains a user-scoped bearer token by chaining three dependent
//! federated identity credential exchanges against one token endpoint,
//! caching each intermediate token until shortly before it expires.
//!
//! Modules:
//! - `cache`: expiring token cache keyed by token kind and request parameters
//! - `sources`: token endpoint client and the three-step chain executor
//! - `sinks`: the output record handed to downstream callers
//! - `config`: credentials, settings, YAML loading and validation
//! - `resilience`: whole-chain retry with backoff

pub mod cache;
pub mod config;
pub mod errors;
pub mod helpers;
pub mod observability;
pub mod resilience;
pub mod sinks;
pub mod sources;
pub mod utils;

#[cfg(test)]
mod tests;

pub use crate::cache::cache_key::{CacheKey, TokenKind, TokenRequestParams};
pub use crate::cache::token_cache::TokenCache;
pub use crate::config::credentials::Credentials;
pub use crate::errors::{ChainError, ChainFailure};
pub use crate::sinks::chain_result::{CacheStatistics, ChainResult};
pub use crate::sources::executor::chain::{ChainOrchestrator, ChainPolicy};
pub use crate::sources::fetch::{FetchToken, HttpTokenFetcher, TokenResponse};
