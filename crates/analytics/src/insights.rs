//! Per-product insights from the trailing window versus the one before it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use forgepos_core::ProductId;

use crate::error::AnalyticsError;
use crate::forecast::Trend;
use crate::job::AnalyticsJob;
use crate::snapshot::{SalesSnapshot, window_start};
use crate::stats::ratio_or;

/// Percent change in units sold beyond which a product is trending.
pub const SALES_CHANGE_THRESHOLD: f64 = 20.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Opportunity,
    Warning,
    Success,
}

/// Per-product accumulator for one analysis run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductMetric {
    pub product_id: ProductId,
    pub product_name: String,
    pub recent_sales: f64,
    pub recent_revenue: f64,
    pub recent_cost: f64,
    pub older_sales: f64,
    pub older_revenue: f64,
}

impl ProductMetric {
    fn new(product_id: ProductId, product_name: String) -> Self {
        Self {
            product_id,
            product_name,
            recent_sales: 0.0,
            recent_revenue: 0.0,
            recent_cost: 0.0,
            older_sales: 0.0,
            older_revenue: 0.0,
        }
    }

    /// Gross margin of the recent window, in percent.
    pub fn profit_margin(&self) -> f64 {
        ratio_or(self.recent_revenue - self.recent_cost, self.recent_revenue, 0.0) * 100.0
    }

    /// Percent change in units sold; `100` when nothing sold before.
    pub fn sales_change(&self) -> f64 {
        if self.older_sales == 0.0 {
            return 100.0;
        }
        (self.recent_sales - self.older_sales) / self.older_sales * 100.0
    }

    pub fn trend(&self) -> Trend {
        let change = self.sales_change();
        if change > SALES_CHANGE_THRESHOLD {
            Trend::Up
        } else if change < -SALES_CHANGE_THRESHOLD {
            Trend::Down
        } else {
            Trend::Stable
        }
    }

    /// Units per day scaled to 0–100.
    pub fn velocity_score(&self, window_days: u32) -> f64 {
        let per_day = ratio_or(self.recent_sales, f64::from(window_days), 0.0);
        (per_day * 10.0).min(100.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightMetrics {
    pub recent_sales: f64,
    pub recent_revenue: f64,
    pub older_sales: f64,
    pub older_revenue: f64,
    pub sales_change: f64,
    pub profit_margin: f64,
    pub velocity_score: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductInsight {
    pub product_id: ProductId,
    pub product_name: String,
    pub insight: String,
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub metrics: InsightMetrics,
    pub recommendations: Vec<String>,
}

/// Accumulate metrics for products sold in the recent window.
///
/// Products are returned in order of first appearance in the recent window;
/// older-window sales only count for products already present.
pub fn collect_product_metrics(snapshot: &SalesSnapshot, window_days: u32) -> Vec<ProductMetric> {
    let recent_start = window_start(snapshot.as_of, window_days);
    let older_start = window_start(snapshot.as_of, window_days.saturating_mul(2));

    let mut metrics: Vec<ProductMetric> = Vec::new();
    let mut index: HashMap<ProductId, usize> = HashMap::new();

    for sale in snapshot.sales.iter().filter(|s| s.created_at >= recent_start) {
        let slot = *index.entry(sale.product_id).or_insert_with(|| {
            metrics.push(ProductMetric::new(sale.product_id, sale.product.name.clone()));
            metrics.len() - 1
        });
        let m = &mut metrics[slot];
        m.recent_sales += sale.quantity as f64;
        m.recent_revenue += sale.total;
        m.recent_cost += sale.cost();
    }

    for sale in snapshot
        .sales
        .iter()
        .filter(|s| s.created_at >= older_start && s.created_at < recent_start)
    {
        if let Some(&slot) = index.get(&sale.product_id) {
            let m = &mut metrics[slot];
            m.older_sales += sale.quantity as f64;
            m.older_revenue += sale.total;
        }
    }

    metrics
}

/// First matching rule wins; products matching none get no insight.
pub fn insight_for(metric: &ProductMetric, window_days: u32) -> Option<ProductInsight> {
    let trend = metric.trend();
    let profit_margin = metric.profit_margin();
    let velocity_score = metric.velocity_score(window_days);
    let sales_change = metric.sales_change();
    let name = &metric.product_name;

    let (insight_type, insight, recommendations) = if trend == Trend::Up && profit_margin > 30.0 {
        (
            InsightType::Success,
            format!(
                "{name} is a strong performer: sales up {sales_change:.1}% with a {profit_margin:.1}% margin."
            ),
            vec![
                "Increase inventory levels to meet growing demand".to_string(),
                "Maintain current pricing".to_string(),
            ],
        )
    } else if trend == Trend::Down {
        (
            InsightType::Warning,
            format!("{name} is declining: sales down {:.1}% versus the previous period.", sales_change.abs()),
            vec![
                "Run promotional pricing to stimulate demand".to_string(),
                "Reposition the product in store and online".to_string(),
                "Review competitor pricing and offers".to_string(),
            ],
        )
    } else if velocity_score < 10.0 {
        (
            InsightType::Warning,
            format!("{name} is slow-moving: velocity score {velocity_score:.1} out of 100."),
            vec![
                "Consider clearance pricing".to_string(),
                "Reduce the reorder quantity".to_string(),
            ],
        )
    } else if profit_margin > 40.0 {
        (
            InsightType::Opportunity,
            format!("{name} earns a high margin of {profit_margin:.1}%."),
            vec![
                "Focus marketing on this product".to_string(),
                "Bundle it with slower-moving items".to_string(),
            ],
        )
    } else {
        return None;
    };

    Some(ProductInsight {
        product_id: metric.product_id,
        product_name: metric.product_name.clone(),
        insight,
        insight_type,
        metrics: InsightMetrics {
            recent_sales: metric.recent_sales,
            recent_revenue: metric.recent_revenue,
            older_sales: metric.older_sales,
            older_revenue: metric.older_revenue,
            sales_change,
            profit_margin,
            velocity_score,
            trend,
        },
        recommendations,
    })
}

/// Generate at most `limit` product insights.
#[derive(Debug, Clone)]
pub struct ProductInsightJob {
    input: SalesSnapshot,
    window_days: u32,
    limit: usize,
}

impl ProductInsightJob {
    pub fn new(input: SalesSnapshot) -> Self {
        Self {
            input,
            window_days: 30,
            limit: 10,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn with_window_days(mut self, window_days: u32) -> Self {
        self.window_days = window_days;
        self
    }
}

impl AnalyticsJob for ProductInsightJob {
    type Output = Vec<ProductInsight>;
    const NAME: &'static str = "product_insights";

    fn run(&self) -> Result<Vec<ProductInsight>, AnalyticsError> {
        self.input.validate()?;
        if self.window_days == 0 {
            return Err(AnalyticsError::invalid_input("insight window must be at least one day"));
        }

        Ok(collect_product_metrics(&self.input, self.window_days)
            .iter()
            .filter_map(|m| insight_for(m, self.window_days))
            .take(self.limit)
            .collect())
    }
}
