use std::sync::RwLock;

use chrono::{DateTime, Utc};

use forgepos_analytics::{MovementKind, SaleRecord, StockMovement, VariantStock};
use forgepos_core::VariantId;

use super::{AnalyticsSource, DataAccessError, Dataset};

/// In-memory analytics source for tests/dev and dataset replays.
#[derive(Debug, Default)]
pub struct InMemoryAnalyticsSource {
    inner: RwLock<Dataset>,
    failure: RwLock<Option<String>>,
}

impl InMemoryAnalyticsSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(dataset: Dataset) -> Self {
        Self {
            inner: RwLock::new(dataset),
            failure: RwLock::new(None),
        }
    }

    pub fn push_sale(&self, sale: SaleRecord) {
        if let Ok(mut data) = self.inner.write() {
            data.sales.push(sale);
        }
    }

    pub fn push_movement(&self, movement: StockMovement) {
        if let Ok(mut data) = self.inner.write() {
            data.movements.push(movement);
        }
    }

    /// Insert a variant, replacing any existing one with the same id.
    pub fn upsert_variant(&self, variant: VariantStock) {
        if let Ok(mut data) = self.inner.write() {
            match data
                .variants
                .iter_mut()
                .find(|v| v.variant_id == variant.variant_id)
            {
                Some(existing) => *existing = variant,
                None => data.variants.push(variant),
            }
        }
    }

    pub fn set_product_count(&self, count: u64) {
        if let Ok(mut data) = self.inner.write() {
            data.product_count = Some(count);
        }
    }

    /// Make every fetch fail with `Unavailable(reason)` until [`Self::recover`].
    pub fn fail_with(&self, reason: impl Into<String>) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = Some(reason.into());
        }
    }

    pub fn recover(&self) {
        if let Ok(mut failure) = self.failure.write() {
            *failure = None;
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Dataset) -> T) -> Result<T, DataAccessError> {
        let failure = self
            .failure
            .read()
            .map_err(|_| DataAccessError::Unavailable("failure flag lock poisoned".to_string()))?;
        if let Some(reason) = failure.as_ref() {
            return Err(DataAccessError::Unavailable(reason.clone()));
        }

        let data = self
            .inner
            .read()
            .map_err(|_| DataAccessError::Unavailable("dataset lock poisoned".to_string()))?;
        Ok(f(&data))
    }
}

#[async_trait::async_trait]
impl AnalyticsSource for InMemoryAnalyticsSource {
    async fn fetch_sales(&self, since: DateTime<Utc>) -> Result<Vec<SaleRecord>, DataAccessError> {
        self.read(|data| {
            data.sales
                .iter()
                .filter(|s| s.created_at >= since)
                .cloned()
                .collect()
        })
    }

    async fn fetch_stock_movements(
        &self,
        variant_id: VariantId,
        since: DateTime<Utc>,
        kind: MovementKind,
    ) -> Result<Vec<StockMovement>, DataAccessError> {
        self.read(|data| {
            data.movements
                .iter()
                .filter(|m| m.variant_id == variant_id && m.kind == kind && m.created_at >= since)
                .cloned()
                .collect()
        })
    }

    async fn fetch_variants_needing_review(&self) -> Result<Vec<VariantStock>, DataAccessError> {
        self.read(|data| data.variants.iter().filter(|v| !v.archived).cloned().collect())
    }

    async fn fetch_product_count(&self) -> Result<u64, DataAccessError> {
        self.read(|data| data.product_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use forgepos_analytics::SaleProduct;
    use forgepos_core::ProductId;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap()
    }

    fn sale(product_id: ProductId, days_ago: i64) -> SaleRecord {
        SaleRecord {
            product_id,
            variant_id: None,
            quantity: 1,
            total: 10.0,
            created_at: now() - Duration::days(days_ago),
            product: SaleProduct {
                name: "Tea".to_string(),
                base_cost: 2.0,
            },
        }
    }

    fn variant(stock: i64, archived: bool) -> VariantStock {
        VariantStock {
            product_id: ProductId::new(),
            variant_id: VariantId::new(),
            product_name: "Tea".to_string(),
            variant_name: "Loose".to_string(),
            stock,
            reorder_point: 10,
            archived,
            preferred_supplier: None,
        }
    }

    #[tokio::test]
    async fn fetch_sales_filters_by_since() {
        let source = InMemoryAnalyticsSource::new();
        let id = ProductId::new();
        source.push_sale(sale(id, 5));
        source.push_sale(sale(id, 50));

        let sales = source.fetch_sales(now() - Duration::days(30)).await.unwrap();
        assert_eq!(sales.len(), 1);
    }

    #[tokio::test]
    async fn fetch_movements_filters_variant_kind_and_time() {
        let source = InMemoryAnalyticsSource::new();
        let target = VariantId::new();
        let other = VariantId::new();
        for (variant_id, kind, days_ago) in [
            (target, MovementKind::Sale, 1),
            (target, MovementKind::Purchase, 1),
            (target, MovementKind::Sale, 100),
            (other, MovementKind::Sale, 1),
        ] {
            source.push_movement(StockMovement {
                variant_id,
                kind,
                quantity: -1,
                created_at: now() - Duration::days(days_ago),
            });
        }

        let movements = source
            .fetch_stock_movements(target, now() - Duration::days(90), MovementKind::Sale)
            .await
            .unwrap();
        assert_eq!(movements.len(), 1);
    }

    #[tokio::test]
    async fn archived_variants_are_not_reviewed() {
        let source = InMemoryAnalyticsSource::new();
        source.upsert_variant(variant(1, false));
        source.upsert_variant(variant(1, true));
        assert_eq!(source.fetch_variants_needing_review().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_variant() {
        let source = InMemoryAnalyticsSource::new();
        let mut v = variant(1, false);
        source.upsert_variant(v.clone());
        v.stock = 7;
        source.upsert_variant(v);
        let variants = source.fetch_variants_needing_review().await.unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].stock, 7);
    }

    #[tokio::test]
    async fn product_count_defaults_to_distinct_products() {
        let source = InMemoryAnalyticsSource::new();
        let id = ProductId::new();
        source.push_sale(sale(id, 1));
        source.push_sale(sale(id, 2));
        source.upsert_variant(variant(1, false));
        assert_eq!(source.fetch_product_count().await.unwrap(), 2);

        source.set_product_count(40);
        assert_eq!(source.fetch_product_count().await.unwrap(), 40);
    }

    #[tokio::test]
    async fn failure_mode_fails_every_fetch_until_recovered() {
        let source = InMemoryAnalyticsSource::new();
        source.fail_with("database offline");

        let err = source.fetch_product_count().await.unwrap_err();
        assert_eq!(err, DataAccessError::Unavailable("database offline".to_string()));
        assert!(source.fetch_sales(now()).await.is_err());

        source.recover();
        assert!(source.fetch_sales(now()).await.is_ok());
    }

    #[test]
    fn dataset_parses_from_json() {
        let json = r#"{
            "variants": [{
                "product_id": "0190a4b2-0000-7000-8000-000000000001",
                "variant_id": "0190a4b2-0000-7000-8000-000000000002",
                "product_name": "Tea",
                "variant_name": "Loose",
                "stock": 3,
                "reorder_point": 10,
                "preferred_supplier": {
                    "supplier_id": "0190a4b2-0000-7000-8000-000000000003",
                    "supplier_name": "Leaf & Co",
                    "cost": 4.5
                }
            }]
        }"#;
        let dataset = Dataset::from_json(json).unwrap();
        assert_eq!(dataset.variants.len(), 1);
        assert!(!dataset.variants[0].archived);
        let supplier = dataset.variants[0].preferred_supplier.as_ref().unwrap();
        assert_eq!(supplier.lead_time_days, None);
        assert_eq!(dataset.product_count(), 1);
    }
}
