//! Criterion micro-benchmarks for append, lookup, and random insertion.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scree_bench::{shuffled_indices, tuple_values};
use scree_core::StoreConfig;
use scree_store::{BlockList, SparseBlockList};

const N: usize = 10_000;

/// Benchmark: append 10K tuples to a fresh list.
fn bench_append_10k(c: &mut Criterion) {
    let values = tuple_values(N, 42);
    c.bench_function("append_10k", |b| {
        b.iter(|| {
            let list = BlockList::<u64>::new();
            for &v in &values {
                black_box(list.append(v));
            }
            black_box(list.len());
        });
    });
}

/// Benchmark: 10K random-order lookups on a populated list.
fn bench_get_shuffled_10k(c: &mut Criterion) {
    let list = BlockList::<u64>::new();
    for &v in &tuple_values(N, 42) {
        list.append(v);
    }
    let order = shuffled_indices(N, 7);
    c.bench_function("get_shuffled_10k", |b| {
        b.iter(|| {
            let mut acc = 0u64;
            for &i in &order {
                acc = acc.wrapping_add(*list.get(i));
            }
            black_box(acc);
        });
    });
}

/// Benchmark: place 10K tuples at shuffled indices, growing several blocks.
fn bench_insert_at_shuffled_10k(c: &mut Criterion) {
    let order = shuffled_indices(N, 7);
    c.bench_function("insert_at_shuffled_10k", |b| {
        b.iter(|| {
            let list = SparseBlockList::<u64>::with_config(StoreConfig::with_block_bits(8))
                .expect("valid config");
            for &i in &order {
                list.insert_at(i, i as u64);
            }
            black_box(list.len());
        });
    });
}

/// Benchmark: sequential iteration over 10K appended tuples.
fn bench_iterate_10k(c: &mut Criterion) {
    let list = BlockList::<u64>::new();
    for &v in &tuple_values(N, 42) {
        list.append(v);
    }
    c.bench_function("iterate_10k", |b| {
        b.iter(|| {
            let sum: u64 = list.iter().fold(0u64, |acc, &v| acc.wrapping_add(v));
            black_box(sum);
        });
    });
}

criterion_group!(
    benches,
    bench_append_10k,
    bench_get_shuffled_10k,
    bench_insert_at_shuffled_10k,
    bench_iterate_10k
);
criterion_main!(benches);
