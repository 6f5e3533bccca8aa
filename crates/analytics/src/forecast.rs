//! Revenue forecasting by linear regression over the daily revenue series.
//!
//! Model:
//! - Index the aggregated daily points `0..n` (gaps are not zero-filled).
//! - Fit an ordinary least squares line over `(index, revenue)`.
//! - Extrapolate one point per future day with a ±1.96σ band, where σ is the
//!   standard deviation of the historical residuals.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalyticsError;
use crate::job::AnalyticsJob;
use crate::seasonality::detect_weekly_seasonality;
use crate::snapshot::{SalesSnapshot, window_start};
use crate::stats::{LinearFit, mean, ratio_or, stddev_population};
use crate::timeseries::{DailyRevenuePoint, aggregate_daily_revenue, revenues};

/// Fewer aggregated days than this yields the empty fallback forecast.
pub const MIN_FORECAST_POINTS: usize = 7;

/// Slope (revenue per indexed day) beyond which the trend is directional.
pub const TREND_SLOPE_THRESHOLD: f64 = 0.5;

/// z-score for the 95% confidence band.
pub const CONFIDENCE_Z: f64 = 1.96;

/// Points averaged at each end of the series for the growth rate.
const GROWTH_WINDOW: usize = 7;

/// Qualitative direction of a series.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Up,
    Down,
    Stable,
}

/// Predicted revenue for one future day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_revenue: f64,
    /// 0–100, decreasing by 2 per day of horizon.
    pub confidence: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub predictions: Vec<ForecastPoint>,
    pub trend: Trend,
    /// 0–100.
    pub trend_strength: f64,
    pub seasonality_detected: bool,
    /// Percent change between the first and last week of history.
    pub growth_rate: f64,
}

impl ForecastResult {
    /// Result returned when there is too little history to fit a trend.
    pub fn insufficient_data() -> Self {
        Self {
            predictions: Vec::new(),
            trend: Trend::Stable,
            trend_strength: 0.0,
            seasonality_detected: false,
            growth_rate: 0.0,
        }
    }
}

pub fn classify_trend(slope: f64) -> Trend {
    if slope > TREND_SLOPE_THRESHOLD {
        Trend::Up
    } else if slope < -TREND_SLOPE_THRESHOLD {
        Trend::Down
    } else {
        Trend::Stable
    }
}

/// Confidence of the `day`-th future point (1-based).
pub fn confidence_for_day(day: u32) -> u32 {
    100u32.saturating_sub(day.saturating_mul(2))
}

/// Percent change of the last week's average over the first week's.
pub fn growth_rate(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let window = GROWTH_WINDOW.min(values.len());
    let first = mean(&values[..window]);
    let last = mean(&values[values.len() - window..]);
    ratio_or(last - first, first, 0.0) * 100.0
}

/// Forecast `horizon_days` beyond `today` from an aggregated daily series.
pub fn forecast_series(series: &[DailyRevenuePoint], horizon_days: u32, today: NaiveDate) -> ForecastResult {
    if series.len() < MIN_FORECAST_POINTS {
        debug!(
            points = series.len(),
            required = MIN_FORECAST_POINTS,
            "insufficient history for revenue forecast"
        );
        return ForecastResult::insufficient_data();
    }

    let values = revenues(series);
    let n = values.len();
    let fit = LinearFit::over_indices(&values);

    let trend = classify_trend(fit.slope);
    let trend_strength = (fit.slope.abs() * 20.0).min(100.0);
    let std_dev = stddev_population(&fit.residuals(&values));
    let margin = CONFIDENCE_Z * std_dev;

    let predictions = (1..=horizon_days)
        .map(|day| {
            let x = (n - 1) as f64 + f64::from(day);
            let predicted = fit.predict(x).max(0.0);
            ForecastPoint {
                date: today + Duration::days(i64::from(day)),
                predicted_revenue: predicted,
                confidence: confidence_for_day(day),
                lower_bound: (predicted - margin).max(0.0),
                upper_bound: predicted + margin,
            }
        })
        .collect();

    ForecastResult {
        predictions,
        trend,
        trend_strength,
        seasonality_detected: detect_weekly_seasonality(&values),
        growth_rate: growth_rate(&values),
    }
}

/// Forecast revenue from a sales snapshot.
#[derive(Debug, Clone)]
pub struct RevenueForecastJob {
    input: SalesSnapshot,
    horizon_days: u32,
    history_days: u32,
}

impl RevenueForecastJob {
    pub fn new(input: SalesSnapshot) -> Self {
        Self {
            input,
            horizon_days: 30,
            history_days: 90,
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
}

impl AnalyticsJob for RevenueForecastJob {
    type Output = ForecastResult;
    const NAME: &'static str = "revenue_forecast";

    fn run(&self) -> Result<ForecastResult, AnalyticsError> {
        self.input.validate()?;
        Ok(forecast_from_snapshot(
            &self.input,
            self.horizon_days,
            self.history_days,
        ))
    }
}

/// Aggregate the trailing `history_days` of a snapshot and forecast from it.
pub(crate) fn forecast_from_snapshot(
    snapshot: &SalesSnapshot,
    horizon_days: u32,
    history_days: u32,
) -> ForecastResult {
    let series = aggregate_daily_revenue(&snapshot.sales, window_start(snapshot.as_of, history_days));
    forecast_series(&series, horizon_days, snapshot.as_of.date_naive())
}
