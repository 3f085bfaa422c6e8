use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Parameters whose values are credentials and must never reach logs.
const SENSITIVE_PARAMS: [&str; 3] = [
    "client_secret",
    "client_assertion",
    "user_federated_identity_credential",
];

/// The three token kinds produced by the exchange chain, in dependency order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum TokenKind {
    #[serde(rename = "blueprint")]
    Blueprint,
    #[serde(rename = "agentFic")]
    AgentFic,
    #[serde(rename = "userToken")]
    UserToken,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Blueprint => "blueprint",
            TokenKind::AgentFic => "agentFic",
            TokenKind::UserToken => "userToken",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Form body of one token request.
///
/// Backed by a `BTreeMap`, so iteration (and therefore the encoded body and
/// the cache key) is sorted by parameter name regardless of insertion order.
#[derive(Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TokenRequestParams(BTreeMap<String, String>);

impl TokenRequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(name.into(), value.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TokenRequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl fmt::Debug for TokenRequestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.0.iter().map(|(k, v)| {
                let shown = if SENSITIVE_PARAMS.contains(&k.as_str()) { "***" } else { v.as_str() };
                (k, shown)
            }))
            .finish()
    }
}

/// Cache slot identity: token kind plus the full, ordered request parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: TokenKind,
    pub params: TokenRequestParams,
}

impl CacheKey {
    pub fn new(kind: TokenKind, params: &TokenRequestParams) -> Self {
        Self { kind, params: params.clone() }
    }
}

/// `<kind>:<name>=<value>&<name>=<value>...`, names in lexicographic order.
impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.kind)?;
        for (i, (name, value)) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str("&")?;
            }
            write!(f, "{}={}", name, value)?;
        }
        Ok(())
    }
}
