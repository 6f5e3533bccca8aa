use chrono::{DateTime, Utc};
use serde::Serialize;

use forgepos_analytics::{CashFlowProjection, FinancialHealth, ForecastResult, ProductInsight, ReorderAnalysis};
use forgepos_core::Clock;
use forgepos_infra::{AnalyticsService, AnalyticsSource, ServiceError};

use crate::cli::ReportKind;

/// Combined output of one CLI run.
#[derive(Debug, Serialize)]
pub struct Report {
    pub as_of: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_forecast: Option<ForecastResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cash_flow: Option<CashFlowProjection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_insights: Option<Vec<ProductInsight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_health: Option<FinancialHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reorder: Option<ReorderAnalysis>,
}

/// Run the selected reports with the service's configured defaults.
pub async fn build_report<S, C>(
    service: &AnalyticsService<S, C>,
    kind: ReportKind,
    as_of: DateTime<Utc>,
) -> Result<Report, ServiceError>
where
    S: AnalyticsSource,
    C: Clock,
{
    let config = service.config().clone();
    let mut report = Report {
        as_of,
        revenue_forecast: None,
        cash_flow: None,
        product_insights: None,
        financial_health: None,
        reorder: None,
    };

    if kind.includes(ReportKind::Forecast) {
        report.revenue_forecast = Some(
            service
                .forecast_revenue(config.forecast_horizon_days, config.forecast_history_days)
                .await?,
        );
    }
    if kind.includes(ReportKind::CashFlow) {
        report.cash_flow = Some(service.project_cash_flow(config.forecast_horizon_days).await?);
    }
    if kind.includes(ReportKind::Insights) {
        report.product_insights = Some(service.generate_product_insights(config.insight_limit).await?);
    }
    if kind.includes(ReportKind::Health) {
        report.financial_health = Some(service.calculate_financial_health().await?);
    }
    if kind.includes(ReportKind::Reorder) {
        report.reorder = Some(service.analyze_reorder_needs().await?);
    }

    Ok(report)
}
