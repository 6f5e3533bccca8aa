//! Cash-flow projection on top of the revenue forecast.
//!
//! Inflow per day is the forecasted revenue; outflow is the average daily
//! cost of goods sold over the trailing cost window.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::forecast::{ForecastResult, forecast_from_snapshot};
use crate::job::AnalyticsJob;
use crate::snapshot::SalesSnapshot;
use crate::stats::mean;

/// Runway (in days) below which the projection is flagged as critical.
pub const CRITICAL_RUNWAY_DAYS: u32 = 30;

pub const CRITICAL_RUNWAY_MESSAGE: &str =
    "Critical: projected cash runs out in under 30 days. Cut discretionary spending and accelerate collections now.";
pub const NEGATIVE_CASH_FLOW_MESSAGE: &str =
    "Warning: projected daily cash flow is negative. Review costs and pricing to restore a positive margin.";
pub const POSITIVE_CASH_FLOW_MESSAGE: &str =
    "Cash flow is projected to stay positive. Consider reinvesting surplus in fast-moving inventory.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub date: NaiveDate,
    pub expected_inflow: f64,
    pub expected_outflow: f64,
    pub net_cash_flow: f64,
    pub cumulative_cash: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowProjection {
    pub projections: Vec<CashFlowPoint>,
    /// Average daily net outflow; `0` when net flow is non-negative.
    pub burn_rate: f64,
    /// Days of cash left at the current burn rate, when meaningful.
    pub runway: Option<u32>,
    pub recommendation: String,
}

/// Average daily cost of goods over the trailing `window_days`.
///
/// The divisor is the window length, not the number of days with sales.
pub fn average_daily_cost(snapshot: &SalesSnapshot, window_days: u32) -> f64 {
    if window_days == 0 {
        return 0.0;
    }
    let cost: f64 = snapshot.since_days(window_days).map(|s| s.cost()).sum();
    cost / f64::from(window_days)
}

/// Combine a revenue forecast with a flat daily cost.
pub fn project_cash_flow(
    forecast: &ForecastResult,
    avg_daily_cost: f64,
    opening_balance: f64,
) -> CashFlowProjection {
    let mut cumulative_cash = opening_balance;
    let projections: Vec<CashFlowPoint> = forecast
        .predictions
        .iter()
        .map(|p| {
            let net_cash_flow = p.predicted_revenue - avg_daily_cost;
            cumulative_cash += net_cash_flow;
            CashFlowPoint {
                date: p.date,
                expected_inflow: p.predicted_revenue,
                expected_outflow: avg_daily_cost,
                net_cash_flow,
                cumulative_cash,
            }
        })
        .collect();

    let nets: Vec<f64> = projections.iter().map(|p| p.net_cash_flow).collect();
    let avg_net = mean(&nets);
    let burn_rate = if avg_net < 0.0 { avg_net.abs() } else { 0.0 };

    let runway = if burn_rate > 0.0 && cumulative_cash > 0.0 {
        Some((cumulative_cash / burn_rate).floor() as u32)
    } else {
        None
    };

    let recommendation = match runway {
        Some(days) if days < CRITICAL_RUNWAY_DAYS => CRITICAL_RUNWAY_MESSAGE,
        _ if avg_net < 0.0 => NEGATIVE_CASH_FLOW_MESSAGE,
        _ => POSITIVE_CASH_FLOW_MESSAGE,
    };

    CashFlowProjection {
        projections,
        burn_rate,
        runway,
        recommendation: recommendation.to_string(),
    }
}

/// Project cash flow from a sales snapshot.
///
/// The snapshot must cover both the forecast history and the cost window.
#[derive(Debug, Clone)]
pub struct CashFlowJob {
    input: SalesSnapshot,
    horizon_days: u32,
    history_days: u32,
    cost_window_days: u32,
    opening_balance: f64,
}

impl CashFlowJob {
    pub fn new(input: SalesSnapshot) -> Self {
        Self {
            input,
            horizon_days: 30,
            history_days: 90,
            cost_window_days: 30,
            opening_balance: 0.0,
        }
    }

    pub fn with_horizon_days(mut self, horizon_days: u32) -> Self {
        self.horizon_days = horizon_days;
        self
    }

    pub fn with_history_days(mut self, history_days: u32) -> Self {
        self.history_days = history_days;
        self
    }

    /// Seed cumulative cash with a known balance instead of zero.
    pub fn with_opening_balance(mut self, opening_balance: f64) -> Self {
        self.opening_balance = opening_balance;
        self
    }
}

impl AnalyticsJob for CashFlowJob {
    type Output = CashFlowProjection;
    const NAME: &'static str = "cash_flow_projection";

    fn run(&self) -> Result<CashFlowProjection, AnalyticsError> {
        self.input.validate()?;
        if !self.opening_balance.is_finite() {
            return Err(AnalyticsError::invalid_input(
                "opening balance must be a finite number",
            ));
        }

        let forecast = forecast_from_snapshot(&self.input, self.horizon_days, self.history_days);
        let avg_daily_cost = average_daily_cost(&self.input, self.cost_window_days);
        Ok(project_cash_flow(&forecast, avg_daily_cost, self.opening_balance))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::{ForecastPoint, Trend};
    use crate::snapshot::fixtures::{as_of, daily_sales, sale};
    use chrono::Duration;
    use forgepos_core::ProductId;

    fn forecast(revenues: &[f64]) -> ForecastResult {
        let start = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        ForecastResult {
            predictions: revenues
                .iter()
                .enumerate()
                .map(|(i, r)| ForecastPoint {
                    date: start + Duration::days(i as i64),
                    predicted_revenue: *r,
                    confidence: 100,
                    lower_bound: *r,
                    upper_bound: *r,
                })
                .collect(),
            trend: Trend::Stable,
            trend_strength: 0.0,
            seasonality_detected: false,
            growth_rate: 0.0,
        }
    }

    #[test]
    fn accumulates_net_flow() {
        let projection = project_cash_flow(&forecast(&[100.0, 150.0, 50.0]), 80.0, 0.0);
        let cumulative: Vec<f64> = projection.projections.iter().map(|p| p.cumulative_cash).collect();
        assert_eq!(cumulative, vec![20.0, 90.0, 60.0]);
        assert_eq!(projection.burn_rate, 0.0);
        assert_eq!(projection.runway, None);
        assert_eq!(projection.recommendation, POSITIVE_CASH_FLOW_MESSAGE);
    }

    #[test]
    fn negative_flow_from_zero_has_no_runway() {
        let projection = project_cash_flow(&forecast(&[10.0; 5]), 30.0, 0.0);
        assert_eq!(projection.burn_rate, 20.0);
        assert_eq!(projection.runway, None);
        assert_eq!(projection.recommendation, NEGATIVE_CASH_FLOW_MESSAGE);
    }

    #[test]
    fn opening_balance_enables_runway() {
        // 5 days at -20/day from 1000 leaves 900; 900 / 20 = 45 days.
        let projection = project_cash_flow(&forecast(&[10.0; 5]), 30.0, 1_000.0);
        assert_eq!(projection.runway, Some(45));
        assert_eq!(projection.recommendation, NEGATIVE_CASH_FLOW_MESSAGE);

        // 400 - 100 = 300; 300 / 20 = 15 days.
        let projection = project_cash_flow(&forecast(&[10.0; 5]), 30.0, 400.0);
        assert_eq!(projection.runway, Some(15));
        assert_eq!(projection.recommendation, CRITICAL_RUNWAY_MESSAGE);
    }

    #[test]
    fn empty_forecast_projects_nothing() {
        let projection = project_cash_flow(&ForecastResult::insufficient_data(), 50.0, 0.0);
        assert!(projection.projections.is_empty());
        assert_eq!(projection.burn_rate, 0.0);
        assert_eq!(projection.runway, None);
    }

    #[test]
    fn daily_cost_divides_by_window_length() {
        let id = ProductId::new();
        let sales = vec![
            sale(id, "A", 1, 3, 30.0, 4.0),
            sale(id, "A", 10, 3, 30.0, 6.0),
            sale(id, "A", 45, 100, 1_000.0, 6.0),
        ];
        let snapshot = SalesSnapshot::new(as_of(), sales);
        assert!((average_daily_cost(&snapshot, 30) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn job_projects_over_the_forecast_horizon() {
        let snapshot = SalesSnapshot::new(as_of(), daily_sales(&[100.0; 20]));
        let projection = CashFlowJob::new(snapshot).with_horizon_days(10).run().unwrap();
        assert_eq!(projection.projections.len(), 10);
        assert!((projection.projections[9].cumulative_cash - 1_000.0).abs() < 1e-6);
    }

    #[test]
    fn job_rejects_non_finite_opening_balance() {
        let snapshot = SalesSnapshot::new(as_of(), daily_sales(&[100.0; 20]));
        let err = CashFlowJob::new(snapshot)
            .with_opening_balance(f64::INFINITY)
            .run()
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput(_)));
    }
}
