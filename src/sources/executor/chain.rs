use tracing::{error, info, warn};

use crate::cache::cache_key::{TokenKind, TokenRequestParams};
use crate::cache::token_cache::TokenCache;
use crate::config::credentials::Credentials;
use crate::config::settings::SettingsConfig;
use crate::errors::{ChainError, ChainFailure};
use crate::helpers::time::{elapsed_millis, get_instant};
use crate::observability::metrics::get_metrics;
use crate::sinks::chain_result::{CacheStatistics, ChainResult, StepReport};
use crate::sources::executor::steps;
use crate::sources::fetch::{FetchToken, HttpTokenFetcher};
use crate::utils::constants::DEFAULT_EXPIRES_IN_SECONDS;

static HIT_MSG: &str = "hit";
static MISS_MSG: &str = "miss";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainPolicy {
    /// Lifetime assumed for responses without `expires_in`.
    pub default_expires_in_seconds: u64,
}

impl Default for ChainPolicy {
    fn default() -> Self {
        Self { default_expires_in_seconds: DEFAULT_EXPIRES_IN_SECONDS }
    }
}

/// Progress of one run, handed to `ChainFailure` if a step aborts it.
#[derive(Debug, Default)]
struct Progress {
    completed: Vec<StepReport>,
    stats: CacheStatistics,
}

impl Progress {
    fn complete(&mut self, report: StepReport) {
        self.stats.record(&report);
        self.completed.push(report);
    }

    fn abort(&self, error: ChainError) -> ChainFailure {
        ChainFailure::new(error, self.completed.clone(), self.stats)
    }
}

/// Runs blueprint FIC -> agent FIC -> user token against one endpoint,
/// reusing cached tokens wherever they are still fresh.
#[derive(Debug, Clone)]
pub struct ChainOrchestrator<F = HttpTokenFetcher> {
    fetcher: F,
    cache: TokenCache,
    policy: ChainPolicy,
}

impl ChainOrchestrator<HttpTokenFetcher> {
    /// Orchestrator over reqwest with a fresh cache, both shaped by `settings`.
    pub fn from_settings(settings: &SettingsConfig) -> Result<Self, reqwest::Error> {
        let fetcher = HttpTokenFetcher::with_timeout(settings.http.timeout_ms)?;
        let cache = TokenCache::with_buffer_seconds(settings.cache.buffer_seconds);
        let policy = ChainPolicy { default_expires_in_seconds: settings.cache.default_expires_in_seconds };
        Ok(Self::new(fetcher, cache).with_policy(policy))
    }
}

impl<F> ChainOrchestrator<F>
where
    F: FetchToken + Send + Sync,
{
    pub fn new(fetcher: F, cache: TokenCache) -> Self {
        Self { fetcher, cache, policy: ChainPolicy::default() }
    }

    pub fn with_policy(mut self, policy: ChainPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &TokenCache {
        &self.cache
    }

    pub fn policy(&self) -> ChainPolicy {
        self.policy
    }

    /// Execute the three dependent exchanges in order.
    ///
    /// The first failing step aborts the run; the returned `ChainFailure`
    /// carries the steps completed before it and the statistics so far.
    pub async fn run(&self, credentials: &Credentials) -> Result<ChainResult, ChainFailure> {
        let metrics = get_metrics().await;
        let result = self.run_steps(credentials).await;
        match &result {
            Ok(chain) => {
                metrics.chain_runs.with_label_values(&["success"]).inc();
                info!(
                    "chain complete, cache hits {}, misses {}, fetch time {} ms",
                    chain.cache_statistics.hits,
                    chain.cache_statistics.misses,
                    chain.cache_statistics.total_elapsed_millis
                );
            }
            Err(failure) => {
                metrics.chain_runs.with_label_values(&["failure"]).inc();
                error!(
                    step = failure.failed_step().map(|s| s.as_str()).unwrap_or("none"),
                    completed = failure.completed_steps.len(),
                    "chain aborted: {}",
                    failure.error
                );
            }
        }
        result
    }

    /// One run per credential set, sequentially, sharing this orchestrator's cache.
    pub async fn run_batch(&self, items: &[Credentials]) -> Vec<Result<ChainResult, ChainFailure>> {
        let mut results = Vec::with_capacity(items.len());
        for credentials in items {
            results.push(self.run(credentials).await);
        }
        results
    }

    async fn run_steps(&self, credentials: &Credentials) -> Result<ChainResult, ChainFailure> {
        let mut progress = Progress::default();
        let credentials = credentials.validate().map_err(|e| progress.abort(e))?;
        let endpoint = credentials.token_endpoint.as_str();

        let params = steps::blueprint_params(&credentials);
        let blueprint_token = self
            .resolve_step(TokenKind::Blueprint, endpoint, &params, &mut progress)
            .await
            .map_err(|e| progress.abort(e))?;

        let params = steps::agent_fic_params(&credentials, &blueprint_token);
        let agent_token = self
            .resolve_step(TokenKind::AgentFic, endpoint, &params, &mut progress)
            .await
            .map_err(|e| progress.abort(e))?;

        let params = steps::user_token_params(&credentials, &blueprint_token, &agent_token);
        let user_token = self
            .resolve_step(TokenKind::UserToken, endpoint, &params, &mut progress)
            .await
            .map_err(|e| progress.abort(e))?;

        Ok(ChainResult::assemble(
            blueprint_token,
            agent_token,
            user_token,
            credentials.scope,
            progress.stats,
        ))
    }

    /// Check cache, else fetch and store.
    async fn resolve_step(
        &self,
        kind: TokenKind,
        endpoint: &str,
        params: &TokenRequestParams,
        progress: &mut Progress,
    ) -> Result<String, ChainError> {
        let metrics = get_metrics().await;
        let step = kind.as_str();

        if let Some(token) = self.cache.get(kind, params).await {
            info!("step '{}' served from cache", step);
            metrics.cache_lookups.with_label_values(&[step, HIT_MSG]).inc();
            progress.complete(StepReport { kind, cache_hit: true, elapsed_millis: 0 });
            return Ok(token);
        }

        info!("step '{}' not cached, fetching", step);
        metrics.cache_lookups.with_label_values(&[step, MISS_MSG]).inc();
        metrics.token_fetch_requests.with_label_values(&[step]).inc();

        let start = get_instant();
        let fetched = self.fetcher.fetch(kind, endpoint, params).await;
        metrics.token_fetch_duration.with_label_values(&[step]).observe(start.elapsed().as_secs_f64());
        let report = StepReport { kind, cache_hit: false, elapsed_millis: elapsed_millis(start) };

        let response = match fetched {
            Ok(response) => response,
            Err(e) => {
                metrics.token_fetch_failures.with_label_values(&[step, e.reason()]).inc();
                // the miss still counts towards the statistics of the aborted run
                progress.stats.record(&report);
                return Err(e);
            }
        };

        let expires_in = response.expires_in_seconds.unwrap_or_else(|| {
            warn!(
                "step '{}' response has no expires_in, assuming {} seconds",
                step, self.policy.default_expires_in_seconds
            );
            self.policy.default_expires_in_seconds
        });
        self.cache.set(kind, params, response.access_token.clone(), expires_in).await;
        info!("step '{}' fetched in {} ms, expires in {} seconds", step, report.elapsed_millis, expires_in);

        progress.complete(report);
        Ok(response.access_token)
    }
}
