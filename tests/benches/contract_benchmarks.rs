//! # CPM Preference Contract Benchmarks
//!
//! ```bash
//! cargo bench --package cpm-tests --bench contract_benchmarks
//! cargo bench --package cpm-tests --bench contract_benchmarks -- cpm/query
//! ```
//!
//! | Group | Path |
//! |-------|------|
//! | `cpm/ingestion/sp` | single create / update |
//! | `cpm/ingestion/abp` | bulk ingestion, clean and mixed |
//! | `cpm/query/qp` | selector query and result serialization |

use cpm_tests::benchmarks;
use criterion::{criterion_group, criterion_main, Criterion};

fn bench_ingestion(c: &mut Criterion) {
    benchmarks::ingestion::register_benchmarks(c);
}

fn bench_query(c: &mut Criterion) {
    benchmarks::query::register_benchmarks(c);
}

criterion_group!(contract_benches, bench_ingestion, bench_query);
criterion_main!(contract_benches);
