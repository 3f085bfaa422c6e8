use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use fic_token_chain::errors::ChainFailure;
use fic_token_chain::observability::metrics::write_metrics_file;
use fic_token_chain::resilience::retry::RetrySettings;
use fic_token_chain::utils::config_loader;
use fic_token_chain::utils::constants::DEFAULT_CONFIG_PATH;
use fic_token_chain::utils::logging::{self, LogLevel};
use fic_token_chain::ChainOrchestrator;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    /// write prometheus text-format metrics here after the run
    #[arg(long, env = "METRICS_FILE")]
    metrics_file: Option<String>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let service_config = config_loader::run(&args.config).await?;
    logging::run(&service_config, args.log_level);

    // -------------------------------
    // 2. Compose client, cache and orchestrator
    // -------------------------------

    let orchestrator = ChainOrchestrator::from_settings(&service_config.settings)
        .context("failed to build HTTP client")?;
    let retry = RetrySettings::from(service_config.settings.retry.as_ref());

    // -------------------------------
    // 3. Run the chain, retrying transient failures; cached steps are not repeated
    // -------------------------------

    info!("running token chain ...");
    let outcome = retry
        .run_with_retry(ChainFailure::is_retryable, || orchestrator.run(&service_config.credentials))
        .await;

    // -------------------------------
    // 4. Report
    // -------------------------------

    let code = match outcome {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(
                step = failure.failed_step().map(|s| s.as_str()).unwrap_or("none"),
                status = failure.error.status().map(|s| s.as_u16()),
                "token chain failed: {}",
                failure.error
            );
            eprintln!("{}", failure);
            ExitCode::FAILURE
        }
    };

    // the record is already out; a metrics write failure must not change the exit code
    if let Some(path) = &args.metrics_file {
        if let Err(e) = write_metrics_file(path).await {
            warn!("{:#}", e);
        }
    }

    Ok(code)
}
