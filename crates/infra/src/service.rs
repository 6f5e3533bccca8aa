//! Analytics facade: fetch the minimum records, then run the pure job.
//!
//! The service is constructed by the caller and passed around by reference
//! (or `Arc`). It holds no mutable state, so concurrent requests are
//! independent. Dropping a request future cancels it at the fetch boundary;
//! computation never awaits.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::debug;

use forgepos_analytics::snapshot::window_start;
use forgepos_analytics::{
    AnalyticsError, AnalyticsJob, CashFlowJob, CashFlowProjection, FinancialHealth,
    FinancialHealthJob, ForecastResult, HEALTH_HISTORY_DAYS, HealthInput, InventorySnapshot,
    MovementKind, ProductInsight, ProductInsightJob, ReorderAnalysis, ReorderJob,
    RevenueForecastJob, SalesSnapshot, VariantSnapshot,
};
use forgepos_core::{Clock, SystemClock};

use crate::config::AnalyticsConfig;
use crate::middleware::with_logging;
use crate::source::{AnalyticsSource, DataAccessError};

/// Cost window of the cash-flow projection and health score.
const TRAILING_WINDOW_DAYS: u32 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("data access failed: {0}")]
    DataAccess(#[from] DataAccessError),

    #[error("analytics failed: {0}")]
    Analytics(#[from] AnalyticsError),
}

pub struct AnalyticsService<S, C = SystemClock> {
    source: S,
    clock: C,
    config: AnalyticsConfig,
}

impl<S: AnalyticsSource> AnalyticsService<S, SystemClock> {
    pub fn new(source: S, config: AnalyticsConfig) -> Self {
        Self::with_clock(source, config, SystemClock)
    }
}

impl<S, C> AnalyticsService<S, C>
where
    S: AnalyticsSource,
    C: Clock,
{
    pub fn with_clock(source: S, config: AnalyticsConfig, clock: C) -> Self {
        Self {
            source,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &AnalyticsConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Forecast daily revenue `horizon_days` ahead from `history_days` of sales.
    pub async fn forecast_revenue(
        &self,
        horizon_days: u32,
        history_days: u32,
    ) -> Result<ForecastResult, ServiceError> {
        with_logging(RevenueForecastJob::NAME, async {
            let sales = self.sales_snapshot(history_days).await?;
            let job = RevenueForecastJob::new(sales)
                .with_horizon_days(horizon_days)
                .with_history_days(history_days);
            Ok(job.run()?)
        })
        .await
    }

    /// Project net cash flow, burn rate and runway over `horizon_days`.
    pub async fn project_cash_flow(&self, horizon_days: u32) -> Result<CashFlowProjection, ServiceError> {
        with_logging(CashFlowJob::NAME, async {
            let history_days = self.config.forecast_history_days;
            let sales = self
                .sales_snapshot(history_days.max(TRAILING_WINDOW_DAYS))
                .await?;
            let job = CashFlowJob::new(sales)
                .with_horizon_days(horizon_days)
                .with_history_days(history_days)
                .with_opening_balance(self.config.opening_cash_balance);
            Ok(job.run()?)
        })
        .await
    }

    /// At most `limit` product insights, in product order.
    pub async fn generate_product_insights(&self, limit: usize) -> Result<Vec<ProductInsight>, ServiceError> {
        with_logging(ProductInsightJob::NAME, async {
            let window_days = self.config.insight_window_days;
            let sales = self.sales_snapshot(window_days.saturating_mul(2)).await?;
            let job = ProductInsightJob::new(sales)
                .with_window_days(window_days)
                .with_limit(limit);
            Ok(job.run()?)
        })
        .await
    }

    /// Weighted health score over the trailing 30 days.
    pub async fn calculate_financial_health(&self) -> Result<FinancialHealth, ServiceError> {
        with_logging(FinancialHealthJob::NAME, async {
            let as_of = self.clock.now();
            // Growth is always forecast from the fixed health history,
            // whatever the forecast settings are.
            let since = window_start(as_of, HEALTH_HISTORY_DAYS.max(TRAILING_WINDOW_DAYS));
            let (sales, product_count) = tokio::try_join!(
                self.source.fetch_sales(since),
                self.source.fetch_product_count(),
            )?;

            let job = FinancialHealthJob::new(HealthInput {
                sales: SalesSnapshot::new(as_of, sales),
                product_count,
            })
            .with_window_days(TRAILING_WINDOW_DAYS);
            Ok(job.run()?)
        })
        .await
    }

    /// Reorder alerts for every variant at or below its reorder point.
    pub async fn analyze_reorder_needs(&self) -> Result<ReorderAnalysis, ServiceError> {
        with_logging(ReorderJob::NAME, async {
            let snapshot = self.inventory_snapshot().await?;
            let job = ReorderJob::new(snapshot)
                .with_lookback_days(self.config.reorder_lookback_days)
                .with_default_lead_time_days(self.config.default_lead_time_days);
            Ok(job.run()?)
        })
        .await
    }

    async fn sales_snapshot(&self, days: u32) -> Result<SalesSnapshot, DataAccessError> {
        let as_of = self.clock.now();
        let sales = self.source.fetch_sales(window_start(as_of, days)).await?;
        debug!(records = sales.len(), days, "fetched sales history");
        Ok(SalesSnapshot::new(as_of, sales))
    }

    async fn inventory_snapshot(&self) -> Result<InventorySnapshot, DataAccessError> {
        let as_of = self.clock.now();
        let since: DateTime<Utc> = window_start(as_of, self.config.reorder_lookback_days);

        let mut variants = Vec::new();
        for variant in self.source.fetch_variants_needing_review().await? {
            // Movements are only needed for variants that can raise an alert.
            if variant.archived || variant.stock > variant.reorder_point {
                continue;
            }
            let sale_movements = self
                .source
                .fetch_stock_movements(variant.variant_id, since, MovementKind::Sale)
                .await?;
            variants.push(VariantSnapshot {
                variant,
                sale_movements,
            });
        }
        debug!(variants = variants.len(), "fetched variants for reorder review");

        Ok(InventorySnapshot::new(as_of, variants))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use forgepos_analytics::{Priority, SaleProduct, SaleRecord, StockMovement, SupplierTerms, Trend, VariantStock};
    use forgepos_core::{FixedClock, ProductId, SupplierId, VariantId};

    use crate::source::InMemoryAnalyticsSource;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap()
    }

    fn service(source: InMemoryAnalyticsSource) -> AnalyticsService<InMemoryAnalyticsSource, FixedClock> {
        AnalyticsService::with_clock(source, AnalyticsConfig::default(), FixedClock::new(now()))
    }

    fn sale(product_id: ProductId, name: &str, days_ago: i64, total: f64, base_cost: f64) -> SaleRecord {
        SaleRecord {
            product_id,
            variant_id: None,
            quantity: 1,
            total,
            created_at: now() - Duration::days(days_ago),
            product: SaleProduct {
                name: name.to_string(),
                base_cost,
            },
        }
    }

    /// Thirty days of steadily rising revenue for one product.
    fn rising_month() -> InMemoryAnalyticsSource {
        let source = InMemoryAnalyticsSource::new();
        let id = ProductId::new();
        for day in 1..=30 {
            source.push_sale(sale(id, "Espresso", day, 100.0 + (30 - day) as f64 * 5.0, 40.0));
        }
        source
    }

    #[tokio::test]
    async fn forecast_uses_fetched_history() {
        let result = service(rising_month()).forecast_revenue(14, 90).await.unwrap();
        assert_eq!(result.predictions.len(), 14);
        assert_eq!(result.trend, Trend::Up);
        assert_eq!(result.predictions[0].date, now().date_naive() + Duration::days(1));
    }

    #[tokio::test]
    async fn forecast_with_sparse_history_is_insufficient() {
        let source = InMemoryAnalyticsSource::new();
        source.push_sale(sale(ProductId::new(), "Tea", 1, 10.0, 1.0));
        let result = service(source).forecast_revenue(30, 90).await.unwrap();
        assert!(result.predictions.is_empty());
        assert_eq!(result.trend, Trend::Stable);
    }

    #[tokio::test]
    async fn cash_flow_starts_from_configured_balance() {
        let config = AnalyticsConfig {
            opening_cash_balance: 1_000.0,
            ..AnalyticsConfig::default()
        };
        let svc = AnalyticsService::with_clock(rising_month(), config, FixedClock::new(now()));
        let projection = svc.project_cash_flow(7).await.unwrap();

        assert_eq!(projection.projections.len(), 7);
        let first = &projection.projections[0];
        assert!((first.cumulative_cash - (1_000.0 + first.net_cash_flow)).abs() < 1e-9);
        assert_eq!(projection.runway, None);
    }

    #[tokio::test]
    async fn insights_are_limited() {
        let source = InMemoryAnalyticsSource::new();
        for i in 0..5 {
            let id = ProductId::new();
            // Twenty units a month is slow-moving, so every product earns an insight.
            for day in 1..=20 {
                source.push_sale(sale(id, &format!("Item {i}"), day, 10.0, 9.5));
            }
        }
        let insights = service(source).generate_product_insights(3).await.unwrap();
        assert_eq!(insights.len(), 3);
    }

    #[tokio::test]
    async fn financial_health_reads_catalog_size() {
        let source = rising_month();
        source.set_product_count(1);
        let health = service(source).calculate_financial_health().await.unwrap();
        assert!(health.score <= 100);
        assert_eq!(health.indicators.inventory_turnover.value, 30.0);
    }

    #[tokio::test]
    async fn health_growth_ignores_a_short_forecast_history() {
        let source = InMemoryAnalyticsSource::new();
        let id = ProductId::new();
        for day in 1..=90 {
            let total = if day <= 30 { 100.0 } else { 50.0 };
            source.push_sale(sale(id, "Latte", day, total, 10.0));
        }
        let config = AnalyticsConfig {
            forecast_history_days: 30,
            ..AnalyticsConfig::default()
        };
        let svc = AnalyticsService::with_clock(source, config, FixedClock::new(now()));

        let health = svc.calculate_financial_health().await.unwrap();
        let forecast = svc.forecast_revenue(30, 90).await.unwrap();

        assert!((forecast.growth_rate - 100.0).abs() < 1e-9);
        assert_eq!(health.indicators.growth_rate.value, forecast.growth_rate);
    }

    #[tokio::test]
    async fn reorder_fetches_movements_for_low_stock_variants() {
        let source = InMemoryAnalyticsSource::new();
        let low = VariantId::new();
        source.upsert_variant(VariantStock {
            product_id: ProductId::new(),
            variant_id: low,
            product_name: "Beans".to_string(),
            variant_name: "1kg".to_string(),
            stock: 8,
            reorder_point: 20,
            archived: false,
            preferred_supplier: Some(SupplierTerms {
                supplier_id: SupplierId::new(),
                supplier_name: "Roastery".to_string(),
                cost: 12.0,
                lead_time_days: Some(5),
            }),
        });
        source.upsert_variant(VariantStock {
            product_id: ProductId::new(),
            variant_id: VariantId::new(),
            product_name: "Cups".to_string(),
            variant_name: "Large".to_string(),
            stock: 500,
            reorder_point: 50,
            archived: false,
            preferred_supplier: None,
        });
        for day in 1..=10 {
            source.push_movement(StockMovement {
                variant_id: low,
                kind: MovementKind::Sale,
                quantity: -45,
                created_at: now() - Duration::days(day),
            });
        }

        let analysis = service(source).analyze_reorder_needs().await.unwrap();
        assert_eq!(analysis.alerts.len(), 1);
        let alert = &analysis.alerts[0];
        assert_eq!(alert.variant_id, low);
        assert_eq!(alert.priority, Priority::Critical);
        assert_eq!(analysis.summary.critical, 1);
        assert_eq!(analysis.summary.total, 1);
    }

    #[tokio::test]
    async fn source_failures_propagate_without_retry() {
        let source = rising_month();
        source.fail_with("database offline");
        let svc = service(source);

        let err = svc.forecast_revenue(30, 90).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::DataAccess(DataAccessError::Unavailable("database offline".to_string()))
        );
        assert!(svc.calculate_financial_health().await.is_err());
        assert!(svc.analyze_reorder_needs().await.is_err());

        svc.source().recover();
        assert!(svc.forecast_revenue(30, 90).await.is_ok());
    }

    #[tokio::test]
    async fn invalid_records_surface_as_analytics_errors() {
        let source = InMemoryAnalyticsSource::new();
        source.push_sale(sale(ProductId::new(), "Tea", 1, f64::NAN, 1.0));
        let err = service(source).forecast_revenue(30, 90).await.unwrap_err();
        assert!(matches!(err, ServiceError::Analytics(AnalyticsError::InvalidInput(_))));
    }
}
