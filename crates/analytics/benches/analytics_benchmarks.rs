use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use chrono::{Duration, TimeZone, Utc};
use forgepos_analytics::{
    AnalyticsJob, InventorySnapshot, MovementKind, ReorderJob, RevenueForecastJob, SaleProduct,
    SaleRecord, SalesSnapshot, StockMovement, VariantSnapshot, VariantStock,
};
use forgepos_core::{ProductId, VariantId};

fn sales_history(days: i64, sales_per_day: i64) -> SalesSnapshot {
    let as_of = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();
    let product_id = ProductId::new();
    let mut sales = Vec::with_capacity((days * sales_per_day) as usize);
    for day in 1..=days {
        for n in 0..sales_per_day {
            sales.push(SaleRecord {
                product_id,
                variant_id: None,
                quantity: 1 + n % 3,
                total: 20.0 + (day % 7) as f64 * 5.0 + n as f64,
                created_at: as_of - Duration::days(day) + Duration::minutes(n),
                product: SaleProduct {
                    name: "Cold Brew".to_string(),
                    base_cost: 6.5,
                },
            });
        }
    }
    SalesSnapshot::new(as_of, sales)
}

fn inventory(variants: usize) -> InventorySnapshot {
    let as_of = Utc.with_ymd_and_hms(2024, 6, 30, 18, 0, 0).unwrap();
    let variants = (0..variants)
        .map(|i| {
            let variant_id = VariantId::new();
            VariantSnapshot {
                variant: VariantStock {
                    product_id: ProductId::new(),
                    variant_id,
                    product_name: format!("Product {i}"),
                    variant_name: "Default".to_string(),
                    stock: (i % 25) as i64,
                    reorder_point: 20,
                    archived: false,
                    preferred_supplier: None,
                },
                sale_movements: (1..=90)
                    .map(|d| StockMovement {
                        variant_id,
                        kind: MovementKind::Sale,
                        quantity: -((d % 4) as i64),
                        created_at: as_of - Duration::days(d),
                    })
                    .collect(),
            }
        })
        .collect();
    InventorySnapshot::new(as_of, variants)
}

fn bench_revenue_forecast(c: &mut Criterion) {
    let mut group = c.benchmark_group("revenue_forecast");

    for sales_per_day in [10i64, 100, 1_000] {
        let snapshot = sales_history(90, sales_per_day);
        group.throughput(Throughput::Elements(snapshot.sales.len() as u64));
        group.bench_with_input(
            BenchmarkId::new("90_days", sales_per_day),
            &snapshot,
            |b, snapshot| {
                b.iter(|| {
                    RevenueForecastJob::new(black_box(snapshot.clone()))
                        .with_horizon_days(30)
                        .run()
                        .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_reorder_analysis(c: &mut Criterion) {
    let mut group = c.benchmark_group("reorder_analysis");

    for variants in [100usize, 1_000, 10_000] {
        let snapshot = inventory(variants);
        group.throughput(Throughput::Elements(variants as u64));
        group.bench_with_input(BenchmarkId::from_parameter(variants), &snapshot, |b, snapshot| {
            b.iter(|| ReorderJob::new(black_box(snapshot.clone())).run().unwrap());
        });
    }

    group.finish();
}

criterion_group!(benches, bench_revenue_forecast, bench_reorder_analysis);
criterion_main!(benches);
