use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::{Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the process-wide `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Arc::new(Metrics::new())
        })
        .await
}

/// Text exposition format of everything registered so far.
pub async fn render_metrics() -> Result<String> {
    let metrics = get_metrics().await;
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&metrics.registry.gather(), &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Render and write the metrics to `path`.
pub async fn write_metrics_file(path: &str) -> Result<()> {
    let rendered = render_metrics().await?;
    tokio::fs::write(path, rendered)
        .await
        .with_context(|| format!("cannot write metrics to '{}'", path))
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Fetch metrics
    pub token_fetch_requests: IntCounterVec,
    pub token_fetch_failures: IntCounterVec,
    pub token_fetch_duration: HistogramVec,

    // Cache metrics
    pub cache_lookups: IntCounterVec,

    // Chain / config
    pub chain_runs: IntCounterVec,
    pub config_validation_errors: IntCounter,
}

impl Metrics {
    fn new() -> Self {
        let registry = Registry::new_custom(Some("fictokenchain".into()), None)
            .unwrap_or_default();

        let metrics = Self {
            token_fetch_requests: IntCounterVec::new(Opts::new("token_fetch_requests_total", "Token endpoint calls by step"), &["step"])
                .expect("valid metric definition"),
            token_fetch_failures: IntCounterVec::new(Opts::new("token_fetch_failures_total", "Token endpoint failures by step and reason"), &["step", "reason"])
                .expect("valid metric definition"),
            token_fetch_duration: HistogramVec::new(
                HistogramOpts::new("token_fetch_duration_seconds", "Token endpoint call duration seconds")
                    .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
                &["step"],
            )
            .expect("valid metric definition"),

            cache_lookups: IntCounterVec::new(Opts::new("cache_lookups_total", "Token cache lookups by step and result"), &["step", "result"])
                .expect("valid metric definition"),

            chain_runs: IntCounterVec::new(Opts::new("chain_runs_total", "Completed chain runs by outcome"), &["outcome"])
                .expect("valid metric definition"),
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during config load")
                .expect("valid metric definition"),

            registry,
        };

        // Register all metrics in the registry
        let reg = &metrics.registry;
        let collectors: Vec<Box<dyn prometheus::core::Collector>> = vec![
            Box::new(metrics.token_fetch_requests.clone()),
            Box::new(metrics.token_fetch_failures.clone()),
            Box::new(metrics.token_fetch_duration.clone()),
            Box::new(metrics.cache_lookups.clone()),
            Box::new(metrics.chain_runs.clone()),
            Box::new(metrics.config_validation_errors.clone()),
        ];
        for collector in collectors {
            if let Err(e) = reg.register(collector) {
                tracing::warn!("metric registration failed: {}", e);
            }
        }

        metrics
    }
}
