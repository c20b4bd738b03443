//! Performance benchmarks for the payroll engine.
//!
//! This benchmark suite measures:
//! - A single salary calculation with a three-slab tax table
//! - PAYE tax as the number of slabs grows
//! - A full batch of 100 employees, PDF rendering included
//!
//! Run with: `cargo bench`
//! HTML reports are generated in `target/criterion/`

use std::sync::Arc;

use criterion::{
    BatchSize, BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use payroll_engine::batch::{BatchRequest, FailurePolicy, PayrollBatch};
use payroll_engine::calculation::{
    AdjustmentBuckets, AdjustmentLine, calculate_paye_tax, calculate_salary,
};
use payroll_engine::models::{
    Adjustment, AdjustmentBasis, AdjustmentDirection, AdjustmentSource, DateRange, Employee,
    Order, Organization, PayeTaxSlab, SalaryAdjustment, TaxTable,
};
use payroll_engine::payslip::PayslipGenerator;
use payroll_engine::repository::{InMemoryRepository, RepositorySeed};
use payroll_engine::storage::{MemoryObjectStore, UrlSigner};

fn slab(lower: Decimal, upper: Option<Decimal>, rate: Decimal) -> PayeTaxSlab {
    PayeTaxSlab {
        lower_bound: lower,
        upper_bound: upper,
        rate,
    }
}

fn three_slab_table() -> TaxTable {
    TaxTable::new(vec![
        slab(dec!(0), Some(dec!(100000)), dec!(0)),
        slab(dec!(100000), Some(dec!(200000)), dec!(6)),
        slab(dec!(200000), None, dec!(12)),
    ])
    .unwrap()
}

/// Builds a table of `count` slabs, each 25000 wide, the rate rising by 1% per slab.
fn table_with_slabs(count: usize) -> TaxTable {
    let width = dec!(25000);
    let slabs = (0..count)
        .map(|i| {
            let lower = width * Decimal::from(i);
            let upper = (i + 1 < count).then(|| lower + width);
            slab(lower, upper, Decimal::from(i))
        })
        .collect();
    TaxTable::new(slabs).unwrap()
}

fn line(label: &str, amount: Decimal, tax_exempt: bool) -> AdjustmentLine {
    AdjustmentLine {
        label: label.to_string(),
        amount,
        source: AdjustmentSource::General,
        tax_exempt,
    }
}

fn typical_buckets() -> AdjustmentBuckets {
    let mut buckets = AdjustmentBuckets::default();
    buckets.allowance_percentage.push(line("Cost of Living", dec!(10), false));
    buckets.allowance_value.push(line("Transport", dec!(5000), true));
    buckets.deduction_percentage.push(line("EPF", dec!(8), false));
    buckets.push_meal_cost(dec!(2150.75));
    buckets
}

fn adjustment(
    id: &str,
    label: &str,
    amount: Decimal,
    direction: AdjustmentDirection,
) -> SalaryAdjustment {
    SalaryAdjustment {
        id: id.to_string(),
        organization_id: "org_bench".to_string(),
        adjustment: Adjustment {
            label: label.to_string(),
            amount,
            direction,
            basis: AdjustmentBasis::Percentage,
            tax_exempt: false,
        },
    }
}

/// An organization of `count` employees, each with two meal orders in January.
fn seed(count: usize) -> RepositorySeed {
    let employees: Vec<Employee> = (0..count)
        .map(|i| Employee {
            id: format!("emp_{:04}", i),
            organization_id: "org_bench".to_string(),
            name: format!("Employee {}", i),
            designation: None,
            basic_salary: dec!(40000) + Decimal::from(i * 1500),
        })
        .collect();
    let orders = employees
        .iter()
        .flat_map(|e| {
            ["2026-01-08T12:00:00Z", "2026-01-22T12:00:00Z"]
                .into_iter()
                .enumerate()
                .map(move |(n, at)| Order {
                    id: format!("ord_{}_{}", e.id, n),
                    organization_id: "org_bench".to_string(),
                    employee_id: e.id.clone(),
                    placed_at: at.parse().unwrap(),
                    price: dec!(650),
                })
        })
        .collect();

    RepositorySeed {
        organization: Organization {
            id: "org_bench".to_string(),
            name: "Bench Foods".to_string(),
        },
        employees,
        salary_adjustments: vec![
            adjustment("adj_cola", "Cost of Living", dec!(10), AdjustmentDirection::Allowance),
            adjustment("adj_epf", "EPF", dec!(8), AdjustmentDirection::Deduction),
            adjustment("adj_etf", "ETF", dec!(3), AdjustmentDirection::Deduction),
        ],
        individual_adjustments: vec![],
        tax_slabs: three_slab_table().slabs().to_vec(),
        orders,
    }
}

/// Benchmark: one employee's salary.
fn bench_calculate_salary(c: &mut Criterion) {
    let buckets = typical_buckets();
    let table = three_slab_table();

    c.bench_function("calculate_salary", |b| {
        b.iter(|| calculate_salary(black_box(dec!(185000)), black_box(&buckets), &table))
    });
}

/// Benchmark: PAYE tax against growing slab tables.
fn bench_paye_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("paye_scaling");

    for count in [3usize, 10, 50] {
        let table = table_with_slabs(count);
        let income = dec!(25000) * Decimal::from(count) - dec!(1);
        group.bench_with_input(BenchmarkId::from_parameter(count), &table, |b, table| {
            b.iter(|| calculate_paye_tax(black_box(income), table, 3))
        });
    }

    group.finish();
}

/// Benchmark: a batch of 100 employees against the in-memory stores.
fn bench_batch_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let request = BatchRequest {
        organization_id: "org_bench".to_string(),
        month: "01~2026".parse().unwrap(),
        meal_window: DateRange::new(
            "2026-01-01T00:00:00Z".parse().unwrap(),
            "2026-01-31T23:59:59Z".parse().unwrap(),
        )
        .unwrap(),
    };

    let mut group = c.benchmark_group("batch_processing");
    group.throughput(Throughput::Elements(100));
    group.sample_size(20);

    group.bench_function("batch_100", |b| {
        b.to_async(&rt).iter_batched(
            || {
                // Records persist, so every iteration needs fresh stores.
                let store = Arc::new(MemoryObjectStore::new(UrlSigner::new(
                    "bench",
                    "http://localhost:3000",
                )));
                PayrollBatch::new(
                    Arc::new(InMemoryRepository::from_seeds([seed(100)])),
                    PayslipGenerator::new(store),
                    FailurePolicy::Abort,
                )
            },
            |batch| {
                let request = request.clone();
                async move { black_box(batch.run(&request).await.unwrap()) }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_calculate_salary,
    bench_paye_scaling,
    bench_batch_100,
);
criterion_main!(benches);
