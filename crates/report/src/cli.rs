//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, ValueEnum};

use forgepos_observability::LogFormat;

/// Run point-of-sale analytics over a JSON dataset
#[derive(Debug, Parser)]
#[command(name = "forgepos-report")]
#[command(about = "Forecasts, cash flow, product insights, health score and reorder alerts", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Dataset file (sales, movements, variants, product_count)
    pub dataset: PathBuf,

    /// Reference instant (RFC 3339); defaults to the current time
    #[arg(long)]
    pub as_of: Option<DateTime<Utc>>,

    /// Report to run
    #[arg(short, long, value_enum, default_value_t = ReportKind::All)]
    pub report: ReportKind,

    /// Log output format: json, pretty or compact
    #[arg(long, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    All,
    Forecast,
    CashFlow,
    Insights,
    Health,
    Reorder,
}

impl ReportKind {
    pub fn includes(self, other: ReportKind) -> bool {
        self == ReportKind::All || self == other
    }
}
