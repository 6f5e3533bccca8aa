//! Input records and the snapshots jobs compute over.
//!
//! Records are immutable historical facts supplied by the storage layer.
//! Optional fields stay optional here; defaults (such as the supplier lead
//! time) are applied by the job that needs them.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use forgepos_core::{ProductId, SupplierId, VariantId};

use crate::error::AnalyticsError;

/// Product fields denormalized onto a sale line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleProduct {
    pub name: String,
    /// Unit cost of the product at the time of analysis.
    pub base_cost: f64,
}

/// One sold line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    pub product_id: ProductId,
    #[serde(default)]
    pub variant_id: Option<VariantId>,
    pub quantity: i64,
    /// Line total charged to the customer.
    pub total: f64,
    pub created_at: DateTime<Utc>,
    pub product: SaleProduct,
}

impl SaleRecord {
    /// Cost of goods for this line (`quantity * base_cost`).
    pub fn cost(&self) -> f64 {
        self.quantity as f64 * self.product.base_cost
    }
}

/// Kind of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementKind {
    Sale,
    Purchase,
    Return,
    Adjustment,
}

/// A signed change to a variant's stock level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockMovement {
    pub variant_id: VariantId,
    pub kind: MovementKind,
    /// Signed quantity (sales are usually recorded as negative deltas).
    pub quantity: i64,
    pub created_at: DateTime<Utc>,
}

/// Preferred supplier of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierTerms {
    pub supplier_id: SupplierId,
    pub supplier_name: String,
    pub cost: f64,
    /// Days between placing an order and receiving it, when known.
    #[serde(default)]
    pub lead_time_days: Option<u32>,
}

/// Stock position of a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantStock {
    pub product_id: ProductId,
    pub variant_id: VariantId,
    pub product_name: String,
    pub variant_name: String,
    pub stock: i64,
    pub reorder_point: i64,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub preferred_supplier: Option<SupplierTerms>,
}

/// Sale history as of a reference instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSnapshot {
    pub as_of: DateTime<Utc>,
    pub sales: Vec<SaleRecord>,
}

impl SalesSnapshot {
    pub fn new(as_of: DateTime<Utc>, sales: Vec<SaleRecord>) -> Self {
        Self { as_of, sales }
    }

    /// Reject records whose amounts would poison downstream arithmetic.
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        for sale in &self.sales {
            if !sale.total.is_finite() {
                return Err(AnalyticsError::invalid_input(format!(
                    "sale of product {} has a non-finite total",
                    sale.product_id
                )));
            }
            if !sale.product.base_cost.is_finite() {
                return Err(AnalyticsError::invalid_input(format!(
                    "product {} has a non-finite base cost",
                    sale.product_id
                )));
            }
        }
        Ok(())
    }

    /// Sales recorded at or after `as_of - days`.
    pub fn since_days(&self, days: u32) -> impl Iterator<Item = &SaleRecord> {
        let since = window_start(self.as_of, days);
        self.sales.iter().filter(move |s| s.created_at >= since)
    }
}

/// A variant together with its recent SALE movements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSnapshot {
    pub variant: VariantStock,
    pub sale_movements: Vec<StockMovement>,
}

/// Inventory positions as of a reference instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub as_of: DateTime<Utc>,
    pub variants: Vec<VariantSnapshot>,
}

impl InventorySnapshot {
    pub fn new(as_of: DateTime<Utc>, variants: Vec<VariantSnapshot>) -> Self {
        Self { as_of, variants }
    }
}

/// Start of a trailing window of `days` ending at `as_of`.
pub fn window_start(as_of: DateTime<Utc>, days: u32) -> DateTime<Utc> {
    as_of - Duration::days(i64::from(days))
}
