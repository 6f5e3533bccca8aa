//! Analytics service with per-report result caching.
//!
//! Each report keeps its own [`ReportCache`] with the configured TTL; keys
//! carry the report name and its arguments. Failed requests are never cached.

use forgepos_analytics::{
    AnalyticsJob, CashFlowJob, CashFlowProjection, FinancialHealth, FinancialHealthJob,
    ForecastResult, ProductInsight, ProductInsightJob, ReorderAnalysis, ReorderJob,
    RevenueForecastJob,
};
use forgepos_core::{Clock, SystemClock};

use crate::middleware::{ReportCache, with_cache};
use crate::service::{AnalyticsService, ServiceError};
use crate::source::AnalyticsSource;

pub struct CachedAnalytics<S, C = SystemClock> {
    service: AnalyticsService<S, C>,
    forecasts: ReportCache<ForecastResult>,
    cash_flows: ReportCache<CashFlowProjection>,
    insights: ReportCache<Vec<ProductInsight>>,
    health: ReportCache<FinancialHealth>,
    reorder: ReportCache<ReorderAnalysis>,
}

impl<S, C> CachedAnalytics<S, C>
where
    S: AnalyticsSource,
    C: Clock,
{
    /// Wrap `service`; entries live for `config().cache_ttl()`.
    pub fn new(service: AnalyticsService<S, C>) -> Self {
        let ttl = service.config().cache_ttl();
        Self {
            service,
            forecasts: ReportCache::new(ttl),
            cash_flows: ReportCache::new(ttl),
            insights: ReportCache::new(ttl),
            health: ReportCache::new(ttl),
            reorder: ReportCache::new(ttl),
        }
    }

    pub fn service(&self) -> &AnalyticsService<S, C> {
        &self.service
    }

    pub async fn forecast_revenue(
        &self,
        horizon_days: u32,
        history_days: u32,
    ) -> Result<ForecastResult, ServiceError> {
        let key = format!("{}:{horizon_days}:{history_days}", RevenueForecastJob::NAME);
        with_cache(
            &self.forecasts,
            key,
            self.service.forecast_revenue(horizon_days, history_days),
        )
        .await
    }

    pub async fn project_cash_flow(&self, horizon_days: u32) -> Result<CashFlowProjection, ServiceError> {
        let key = format!("{}:{horizon_days}", CashFlowJob::NAME);
        with_cache(&self.cash_flows, key, self.service.project_cash_flow(horizon_days)).await
    }

    pub async fn generate_product_insights(&self, limit: usize) -> Result<Vec<ProductInsight>, ServiceError> {
        let key = format!("{}:{limit}", ProductInsightJob::NAME);
        with_cache(&self.insights, key, self.service.generate_product_insights(limit)).await
    }

    pub async fn calculate_financial_health(&self) -> Result<FinancialHealth, ServiceError> {
        with_cache(
            &self.health,
            FinancialHealthJob::NAME,
            self.service.calculate_financial_health(),
        )
        .await
    }

    pub async fn analyze_reorder_needs(&self) -> Result<ReorderAnalysis, ServiceError> {
        with_cache(&self.reorder, ReorderJob::NAME, self.service.analyze_reorder_needs()).await
    }

    /// Drop every cached report, e.g. after new sales or stock movements.
    pub fn invalidate(&self) {
        self.forecasts.clear();
        self.cash_flows.clear();
        self.insights.clear();
        self.health.clear();
        self.reorder.clear();
    }
}
