//! Composite financial-health score.
//!
//! Four indicators are graded good/fair/poor against fixed thresholds and
//! combined with fixed weights into a 0–100 score.

use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::forecast::forecast_from_snapshot;
use crate::job::AnalyticsJob;
use crate::snapshot::SalesSnapshot;
use crate::stats::ratio_or;

/// Sales history the growth indicator is forecast from.
pub const HEALTH_HISTORY_DAYS: u32 = 90;

/// Forecast horizon used for the growth indicator.
pub const HEALTH_HORIZON_DAYS: u32 = 30;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndicatorStatus {
    Good,
    Fair,
    Poor,
}

impl IndicatorStatus {
    /// Grade `value`: good above `good`, fair above `fair`, else poor.
    pub fn grade(value: f64, good: f64, fair: f64) -> Self {
        if value > good {
            IndicatorStatus::Good
        } else if value > fair {
            IndicatorStatus::Fair
        } else {
            IndicatorStatus::Poor
        }
    }

    pub fn points(self) -> u32 {
        match self {
            IndicatorStatus::Good => 100,
            IndicatorStatus::Fair => 60,
            IndicatorStatus::Poor => 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indicator {
    pub value: f64,
    pub status: IndicatorStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthIndicators {
    pub profit_margin: Indicator,
    pub inventory_turnover: Indicator,
    pub growth_rate: Indicator,
    pub cash_position: Indicator,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialHealth {
    /// 0–100.
    pub score: u32,
    pub indicators: HealthIndicators,
    pub alerts: Vec<String>,
    pub recommendations: Vec<String>,
}

const PROFIT_MARGIN_WEIGHT: u32 = 30;
const INVENTORY_TURNOVER_WEIGHT: u32 = 25;
const GROWTH_RATE_WEIGHT: u32 = 25;
const CASH_POSITION_WEIGHT: u32 = 20;

/// Raw indicator values before grading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HealthFigures {
    pub profit_margin: f64,
    pub inventory_turnover: f64,
    pub growth_rate: f64,
    pub cash_position: f64,
}

/// Grade the figures and build the scored report.
pub fn score_health(figures: HealthFigures) -> FinancialHealth {
    let indicators = HealthIndicators {
        profit_margin: Indicator {
            value: figures.profit_margin,
            status: IndicatorStatus::grade(figures.profit_margin, 30.0, 15.0),
        },
        inventory_turnover: Indicator {
            value: figures.inventory_turnover,
            status: IndicatorStatus::grade(figures.inventory_turnover, 5.0, 2.0),
        },
        growth_rate: Indicator {
            value: figures.growth_rate,
            status: IndicatorStatus::grade(figures.growth_rate, 10.0, 0.0),
        },
        cash_position: Indicator {
            value: figures.cash_position,
            status: IndicatorStatus::grade(figures.cash_position, 10_000.0, 5_000.0),
        },
    };

    let weighted = indicators.profit_margin.status.points() * PROFIT_MARGIN_WEIGHT
        + indicators.inventory_turnover.status.points() * INVENTORY_TURNOVER_WEIGHT
        + indicators.growth_rate.status.points() * GROWTH_RATE_WEIGHT
        + indicators.cash_position.status.points() * CASH_POSITION_WEIGHT;
    let score = (f64::from(weighted) / 100.0).round() as u32;

    let mut alerts = Vec::new();
    let mut recommendations = Vec::new();

    if indicators.profit_margin.status == IndicatorStatus::Poor {
        alerts.push(format!("Low profit margin ({:.1}%)", figures.profit_margin));
        recommendations.push("Review pricing strategy and negotiate better supplier costs".to_string());
    }
    if indicators.inventory_turnover.status == IndicatorStatus::Poor {
        alerts.push(format!("Slow inventory turnover ({:.2})", figures.inventory_turnover));
        recommendations.push("Run promotions to clear slow-moving stock".to_string());
        recommendations.push("Reduce order quantities for low-demand products".to_string());
    }
    if indicators.growth_rate.status == IndicatorStatus::Poor {
        alerts.push(format!("Revenue is not growing ({:.1}%)", figures.growth_rate));
        recommendations.push("Invest in marketing and customer retention".to_string());
    }
    if indicators.cash_position.status == IndicatorStatus::Poor {
        alerts.push(format!("Weak cash position ({:.2})", figures.cash_position));
        recommendations.push("Tighten expense control and build a cash reserve".to_string());
    }

    FinancialHealth {
        score,
        indicators,
        alerts,
        recommendations,
    }
}

/// Input of the health job: recent sales plus the catalog size.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthInput {
    pub sales: SalesSnapshot,
    pub product_count: u64,
}

/// Score financial health from trailing sales.
#[derive(Debug, Clone)]
pub struct FinancialHealthJob {
    input: HealthInput,
    window_days: u32,
    history_days: u32,
    horizon_days: u32,
}

impl FinancialHealthJob {
    pub fn new(input: HealthInput) -> Self {
        Self {
            input,
            window_days: 30,
            history_days: HEALTH_HISTORY_DAYS,
            horizon_days: HEALTH_HORIZON_DAYS,
        }
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }

    fn figures(&self) -> HealthFigures {
        let sales = &self.input.sales;
        let (mut revenue, mut cost, mut count) = (0.0, 0.0, 0u64);
        for sale in sales.since_days(self.window_days) {
            revenue += sale.total;
            cost += sale.cost();
            count += 1;
        }

        let growth_rate = forecast_from_snapshot(sales, self.horizon_days, self.history_days).growth_rate;

        HealthFigures {
            profit_margin: ratio_or(revenue - cost, revenue, 0.0) * 100.0,
            inventory_turnover: ratio_or(count as f64, self.input.product_count as f64, 0.0),
            growth_rate,
            cash_position: revenue - cost,
        }
    }
}

impl AnalyticsJob for FinancialHealthJob {
    type Output = FinancialHealth;
    const NAME: &'static str = "financial_health";

    fn run(&self) -> Result<FinancialHealth, AnalyticsError> {
        self.input.sales.validate()?;
        Ok(score_health(self.figures()))
    }
}
