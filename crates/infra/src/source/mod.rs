//! Data-access collaborator consumed by the analytics service.
//!
//! The storage layer implements [`AnalyticsSource`]; the engine only reads.
//! Failures are returned as-is and never retried here.

pub mod in_memory;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use forgepos_analytics::{MovementKind, SaleRecord, StockMovement, VariantStock};
use forgepos_core::VariantId;

pub use in_memory::InMemoryAnalyticsSource;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DataAccessError {
    #[error("data source unavailable: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

/// Read-only access to the historical records analytics needs.
#[async_trait::async_trait]
pub trait AnalyticsSource: Send + Sync {
    /// Sale lines created at or after `since`, with product name and base cost.
    async fn fetch_sales(&self, since: DateTime<Utc>) -> Result<Vec<SaleRecord>, DataAccessError>;

    /// Movements of one variant of the given kind, created at or after `since`.
    async fn fetch_stock_movements(
        &self,
        variant_id: VariantId,
        since: DateTime<Utc>,
        kind: MovementKind,
    ) -> Result<Vec<StockMovement>, DataAccessError>;

    /// All non-archived variants with stock, reorder point and preferred supplier.
    async fn fetch_variants_needing_review(&self) -> Result<Vec<VariantStock>, DataAccessError>;

    /// Number of products in the catalog.
    async fn fetch_product_count(&self) -> Result<u64, DataAccessError>;
}

#[async_trait::async_trait]
impl<S> AnalyticsSource for Arc<S>
where
    S: AnalyticsSource + ?Sized,
{
    async fn fetch_sales(&self, since: DateTime<Utc>) -> Result<Vec<SaleRecord>, DataAccessError> {
        (**self).fetch_sales(since).await
    }

    async fn fetch_stock_movements(
        &self,
        variant_id: VariantId,
        since: DateTime<Utc>,
        kind: MovementKind,
    ) -> Result<Vec<StockMovement>, DataAccessError> {
        (**self).fetch_stock_movements(variant_id, since, kind).await
    }

    async fn fetch_variants_needing_review(&self) -> Result<Vec<VariantStock>, DataAccessError> {
        (**self).fetch_variants_needing_review().await
    }

    async fn fetch_product_count(&self) -> Result<u64, DataAccessError> {
        (**self).fetch_product_count().await
    }
}

/// A serializable bundle of records (fixtures, exports, the report CLI).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    #[serde(default)]
    pub movements: Vec<StockMovement>,
    #[serde(default)]
    pub variants: Vec<VariantStock>,
    /// Catalog size; when absent, distinct products seen in the records.
    #[serde(default)]
    pub product_count: Option<u64>,
}

impl Dataset {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn product_count(&self) -> u64 {
        if let Some(count) = self.product_count {
            return count;
        }
        let mut seen = HashSet::new();
        seen.extend(self.sales.iter().map(|s| s.product_id));
        seen.extend(self.variants.iter().map(|v| v.product_id));
        seen.len() as u64
    }
}
