use serde::Serialize;

use crate::cache::cache_key::TokenKind;

/// What happened at one step of a chain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub kind: TokenKind,
    pub cache_hit: bool,
    /// Time spent fetching; 0 on a cache hit.
    pub elapsed_millis: u64,
}

/// Fetch time per step in milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StepTimings {
    pub blueprint: u64,
    #[serde(rename = "agentFic")]
    pub agent_fic: u64,
    #[serde(rename = "userToken")]
    pub user_token: u64,
}

impl StepTimings {
    fn set(&mut self, kind: TokenKind, millis: u64) {
        match kind {
            TokenKind::Blueprint => self.blueprint = millis,
            TokenKind::AgentFic => self.agent_fic = millis,
            TokenKind::UserToken => self.user_token = millis,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStatistics {
    #[serde(rename = "cache_hits")]
    pub hits: u32,
    #[serde(rename = "cache_misses")]
    pub misses: u32,
    #[serde(rename = "fetch_times_ms")]
    pub per_step_elapsed_millis: StepTimings,
    #[serde(rename = "total_fetch_time_ms")]
    pub total_elapsed_millis: u64,
}

impl CacheStatistics {
    pub fn record(&mut self, report: &StepReport) {
        if report.cache_hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.per_step_elapsed_millis.set(report.kind, report.elapsed_millis);
        self.total_elapsed_millis += report.elapsed_millis;
    }
}

/// Output record of a successful chain run.
///
/// Serializes to
/// `{ access_token, blueprint_token, agent_token, scope, cache_info: {..} }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainResult {
    /// Final user token.
    pub access_token: String,
    pub blueprint_token: String,
    pub agent_token: String,
    pub scope: String,
    #[serde(rename = "cache_info")]
    pub cache_statistics: CacheStatistics,
}

impl ChainResult {
    pub fn assemble(
        blueprint_token: String,
        agent_token: String,
        user_token: String,
        scope: String,
        cache_statistics: CacheStatistics,
    ) -> Self {
        Self {
            access_token: user_token,
            blueprint_token,
            agent_token,
            scope,
            cache_statistics,
        }
    }

    /// Value for the `Authorization` header of downstream calls.
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.access_token)
    }
}
