//! Reorder alerts for variants at or below their reorder point.
//!
//! Model:
//! - Average daily demand = units sold over the lookback / lookback days.
//! - Days to depletion = stock / average daily demand (999 when nothing sold).
//! - Priority from stock-out, stock ratio and days to depletion.
//! - Order enough to reach twice the reorder point, plus lead-time demand,
//!   plus a 20% safety stock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use forgepos_core::{ProductId, VariantId};

use crate::error::AnalyticsError;
use crate::job::AnalyticsJob;
use crate::snapshot::{InventorySnapshot, MovementKind, StockMovement, VariantSnapshot, window_start};

/// Days to depletion reported when a variant has no recent sales.
pub const NO_DEMAND_DAYS_TO_DEPLETION: u32 = 999;

/// Lead time assumed when the preferred supplier does not state one.
pub const DEFAULT_LEAD_TIME_DAYS: u32 = 7;

/// Safety stock as a fraction of the reorder point.
pub const SAFETY_STOCK_FACTOR: f64 = 0.2;

/// Urgency of a reorder alert, ordered from least to most severe.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertSupplier {
    pub supplier_name: String,
    pub cost: f64,
    /// Lead time actually used for the suggestion (default applied).
    pub lead_time: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderAlert {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_name: String,
    pub current_stock: i64,
    pub reorder_point: i64,
    pub suggested_order_qty: i64,
    pub days_to_depletion: u32,
    pub priority: Priority,
    pub last_sold_date: Option<DateTime<Utc>>,
    pub avg_daily_sales: f64,
    pub supplier_info: Option<AlertSupplier>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReorderSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub total: usize,
}

impl ReorderSummary {
    pub fn tally(alerts: &[ReorderAlert]) -> Self {
        let mut summary = Self::default();
        for alert in alerts {
            match alert.priority {
                Priority::Critical => summary.critical += 1,
                Priority::High => summary.high += 1,
                Priority::Medium => summary.medium += 1,
                Priority::Low => summary.low += 1,
            }
            summary.total += 1;
        }
        summary
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReorderAnalysis {
    pub alerts: Vec<ReorderAlert>,
    pub summary: ReorderSummary,
}

/// Whole days of stock left at `avg_daily_sales`.
pub fn days_to_depletion(stock: i64, avg_daily_sales: f64) -> u32 {
    if avg_daily_sales > 0.0 {
        (stock.max(0) as f64 / avg_daily_sales).floor() as u32
    } else {
        NO_DEMAND_DAYS_TO_DEPLETION
    }
}

/// First matching rule wins, from most to least severe.
pub fn classify_priority(stock: i64, reorder_point: i64, days_to_depletion: u32) -> Priority {
    let stock_ratio = if reorder_point > 0 {
        stock as f64 / reorder_point as f64
    } else {
        0.0
    };

    if stock <= 0 || days_to_depletion <= 1 {
        Priority::Critical
    } else if stock_ratio <= 0.25 || days_to_depletion <= 3 {
        Priority::High
    } else if stock_ratio <= 0.5 || days_to_depletion <= 7 {
        Priority::Medium
    } else {
        Priority::Low
    }
}

/// Quantity to order, never below the reorder point.
pub fn suggested_order_qty(stock: i64, reorder_point: i64, avg_daily_sales: f64, lead_time_days: u32) -> i64 {
    let lead_time_demand = (avg_daily_sales * f64::from(lead_time_days)).ceil() as i64;
    let safety_stock = (reorder_point as f64 * SAFETY_STOCK_FACTOR).ceil() as i64;
    let target = 2 * reorder_point - stock + lead_time_demand + safety_stock;
    target.max(reorder_point)
}

/// Assess one variant; `None` when it is above its reorder point or archived.
pub fn assess_variant(
    snapshot: &VariantSnapshot,
    since: DateTime<Utc>,
    lookback_days: u32,
    default_lead_time_days: u32,
) -> Option<ReorderAlert> {
    let variant = &snapshot.variant;
    if variant.archived || variant.stock > variant.reorder_point {
        return None;
    }

    let sales: Vec<&StockMovement> = snapshot
        .sale_movements
        .iter()
        .filter(|m| m.kind == MovementKind::Sale && m.created_at >= since)
        .collect();

    let units_sold: i64 = sales.iter().map(|m| m.quantity.abs()).sum();
    let avg_daily_sales = if lookback_days == 0 {
        0.0
    } else {
        units_sold as f64 / f64::from(lookback_days)
    };
    let last_sold_date = sales.iter().map(|m| m.created_at).max();

    let days = days_to_depletion(variant.stock, avg_daily_sales);
    let priority = classify_priority(variant.stock, variant.reorder_point, days);

    let lead_time = variant
        .preferred_supplier
        .as_ref()
        .and_then(|s| s.lead_time_days)
        .unwrap_or(default_lead_time_days);

    Some(ReorderAlert {
        product_id: variant.product_id,
        variant_id: variant.variant_id,
        product_name: variant.product_name.clone(),
        variant_name: variant.variant_name.clone(),
        current_stock: variant.stock,
        reorder_point: variant.reorder_point,
        suggested_order_qty: suggested_order_qty(
            variant.stock,
            variant.reorder_point,
            avg_daily_sales,
            lead_time,
        ),
        days_to_depletion: days,
        priority,
        last_sold_date,
        avg_daily_sales,
        supplier_info: variant.preferred_supplier.as_ref().map(|s| AlertSupplier {
            supplier_name: s.supplier_name.clone(),
            cost: s.cost,
            lead_time,
        }),
    })
}

/// Analyze every variant in an inventory snapshot.
#[derive(Debug, Clone)]
pub struct ReorderJob {
    input: InventorySnapshot,
    lookback_days: u32,
    default_lead_time_days: u32,
}

impl ReorderJob {
    pub fn new(input: InventorySnapshot) -> Self {
        Self {
            input,
            lookback_days: 90,
            default_lead_time_days: DEFAULT_LEAD_TIME_DAYS,
        }
    }

    pub fn with_lookback_days(mut self, lookback_days: u32) -> Self {
        self.lookback_days = lookback_days;
        self
    }

    pub fn with_default_lead_time_days(mut self, days: u32) -> Self {
        self.default_lead_time_days = days;
        self
    }
}

impl AnalyticsJob for ReorderJob {
    type Output = ReorderAnalysis;
    const NAME: &'static str = "reorder_analysis";

    fn run(&self) -> Result<ReorderAnalysis, AnalyticsError> {
        if self.lookback_days == 0 {
            return Err(AnalyticsError::invalid_input("reorder lookback must be at least one day"));
        }

        let since = window_start(self.input.as_of, self.lookback_days);
        let mut alerts: Vec<ReorderAlert> = self
            .input
            .variants
            .iter()
            .filter_map(|v| assess_variant(v, since, self.lookback_days, self.default_lead_time_days))
            .collect();

        // Stable: equal priorities keep encounter order.
        alerts.sort_by(|a, b| b.priority.cmp(&a.priority));

        debug!(
            variants = self.input.variants.len(),
            alerts = alerts.len(),
            "reorder analysis complete"
        );

        let summary = ReorderSummary::tally(&alerts);
        Ok(ReorderAnalysis { alerts, summary })
    }
}
