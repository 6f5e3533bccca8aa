mod cli;
mod report;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use forgepos_core::{Clock, FixedClock, SystemClock};
use forgepos_infra::{AnalyticsConfig, AnalyticsService, Dataset, InMemoryAnalyticsSource};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    forgepos_observability::init_with(cli.log_format);

    let config = AnalyticsConfig::from_env().context("invalid FORGEPOS_* configuration")?;

    let raw = tokio::fs::read_to_string(&cli.dataset)
        .await
        .with_context(|| format!("failed to read dataset {}", cli.dataset.display()))?;
    let dataset = Dataset::from_json(&raw)
        .with_context(|| format!("failed to parse dataset {}", cli.dataset.display()))?;
    info!(
        sales = dataset.sales.len(),
        movements = dataset.movements.len(),
        variants = dataset.variants.len(),
        "dataset loaded"
    );

    // Every report in one run shares the same reference instant.
    let as_of = cli.as_of.unwrap_or_else(|| SystemClock.now());
    let service = AnalyticsService::with_clock(
        InMemoryAnalyticsSource::from_dataset(dataset),
        config,
        FixedClock::new(as_of),
    );

    let report = report::build_report(&service, cli.report, as_of)
        .await
        .context("report failed")?;
    let json = serde_json::to_string_pretty(&report).context("failed to serialize report")?;
    println!("{json}");
    Ok(())
}
