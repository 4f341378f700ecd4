//! coinvault entry point.

use std::process::ExitCode;

use coinvault_core::VaultConfig;
use coinvault_pipeline::{
    init_tracing, AppError, CliArgs, RefreshOutcome, RefreshPipeline, TelemetryConfig,
};
use coinvault_report::{generate_report, ChartRenderer, SvgChartRenderer};
use coinvault_source::CoinMarketCapClient;
use coinvault_storage::{CacheStore, RedisBackend};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    if let Err(e) = init_tracing(&TelemetryConfig::default()) {
        eprintln!("{}", e);
    }

    let cli = match CliArgs::from_env() {
        Ok(cli) => cli,
        Err(e) => {
            tracing::error!(error = %e, "invalid arguments");
            return ExitCode::FAILURE;
        }
    };

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "coinvault stopped");
            ExitCode::FAILURE
        }
    }
}

/// Startup failures return `Err`; failures after startup are logged and the
/// run continues with whatever the cache holds.
async fn run(cli: &CliArgs) -> Result<(), AppError> {
    let config = VaultConfig::load(&cli.config_path)?;
    tracing::debug!(path = %cli.config_path.display(), config = ?config, "configuration loaded");

    let backend = RedisBackend::connect(&config.redis).await?;
    let store = CacheStore::new(backend);

    if cli.flush {
        store.flush().await?;
        return Ok(());
    }

    let api_key = config.source.resolve_api_key()?;
    let source = CoinMarketCapClient::from_config(&config.source, api_key)?;
    let pipeline = RefreshPipeline::new(source, store, config.source.limit);

    match pipeline.run().await {
        RefreshOutcome::Stored { receipt, rejected } => {
            tracing::info!(
                generation = receipt.generation,
                written = receipt.written,
                discarded = receipt.discarded,
                rejected = rejected.len(),
                "cache refreshed"
            );
        }
        RefreshOutcome::EmptySource { rejected } => {
            tracing::warn!(rejected = rejected.len(), "nothing stored; keeping existing cache");
        }
        RefreshOutcome::Failed(e) => {
            tracing::warn!(error = %e, "refresh failed; keeping existing cache");
        }
    }

    match pipeline.store().dump().await {
        Ok(entries) => {
            for entry in &entries {
                tracing::info!(target: "coinvault::dump", "{}", entry);
            }
        }
        Err(e) => tracing::warn!(error = %e, "dumping cache failed"),
    }

    let snapshot = match pipeline.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            tracing::warn!(error = %e, "no report generated");
            return Ok(());
        }
    };

    let report = generate_report(&snapshot, config.output.top_n);
    for (period, count) in &report.introductions {
        tracing::info!(period = %period, count, "introductions");
    }
    for (position, entry) in report.names.iter().enumerate() {
        tracing::info!(position = position + 1, name = entry.name, symbol = entry.symbol, "top entity");
    }

    if let Err(e) = SvgChartRenderer::default().render(&report, &config.output.dir) {
        tracing::warn!(error = %e, "chart rendering failed");
    }
    Ok(())
}
