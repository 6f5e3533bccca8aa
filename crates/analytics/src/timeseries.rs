//! Daily revenue aggregation.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::snapshot::SaleRecord;

/// Revenue of one calendar day that had at least one sale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenuePoint {
    pub date: NaiveDate,
    pub revenue: f64,
}

/// Group sales at or after `since` into a chronological daily series.
///
/// Days are the stored timestamp truncated to its date; no timezone
/// conversion happens. Days without sales are absent, not zero.
pub fn aggregate_daily_revenue(sales: &[SaleRecord], since: DateTime<Utc>) -> Vec<DailyRevenuePoint> {
    let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for sale in sales.iter().filter(|s| s.created_at >= since) {
        *by_day.entry(sale.created_at.date_naive()).or_insert(0.0) += sale.total;
    }

    by_day
        .into_iter()
        .map(|(date, revenue)| DailyRevenuePoint { date, revenue })
        .collect()
}

/// Revenue values of a series, in order.
pub fn revenues(series: &[DailyRevenuePoint]) -> Vec<f64> {
    series.iter().map(|p| p.revenue).collect()
}
