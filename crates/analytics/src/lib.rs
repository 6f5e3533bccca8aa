//! `forgepos-analytics`
//!
//! **Responsibility:** the analytics & decision engine of the point-of-sale
//! system (revenue forecasting, cash-flow projection, product insights,
//! financial health and reorder alerts).
//!
//! This crate is intentionally **pure**:
//! - It performs no IO; callers fetch records and hand over snapshots.
//! - It never mutates its inputs and keeps no state between runs.
//! - Identical snapshots always produce identical results.

pub mod cash_flow;
pub mod error;
pub mod forecast;
pub mod health;
pub mod insights;
pub mod job;
pub mod reorder;
pub mod seasonality;
pub mod snapshot;
pub mod stats;
pub mod timeseries;

pub use cash_flow::{CashFlowJob, CashFlowPoint, CashFlowProjection};
pub use error::AnalyticsError;
pub use forecast::{ForecastPoint, ForecastResult, RevenueForecastJob, Trend};
pub use health::{
    FinancialHealth, FinancialHealthJob, HEALTH_HISTORY_DAYS, HealthIndicators, HealthInput, Indicator,
    IndicatorStatus,
};
pub use insights::{InsightMetrics, InsightType, ProductInsight, ProductInsightJob};
pub use job::AnalyticsJob;
pub use reorder::{
    AlertSupplier, Priority, ReorderAlert, ReorderAnalysis, ReorderJob, ReorderSummary,
};
pub use snapshot::{
    InventorySnapshot, MovementKind, SaleProduct, SaleRecord, SalesSnapshot, StockMovement,
    SupplierTerms, VariantSnapshot, VariantStock,
};
pub use timeseries::DailyRevenuePoint;
