//! # Digest and Store Benchmarks
//!
//! Benchmarks for the two hot synchronous paths: digest computation in the
//! scheduler task and identifier allocation under the store lock.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use hashsmith::digest::digest;
use hashsmith::store::JobStore;

/// Benchmark digest computation across payload sizes
fn bench_digest(c: &mut Criterion) {
    let mut group = c.benchmark_group("digest");
    for size in [16usize, 256, 4096] {
        let value = "x".repeat(size);
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &value, |b, value| {
            b.iter(|| digest(black_box(value)));
        });
    }
    group.finish();
}

/// Benchmark identifier allocation, the section every submission serializes on
fn bench_store_allocate(c: &mut Criterion) {
    c.bench_function("store_allocate", |b| {
        let store = JobStore::new();
        b.iter(|| black_box(store.allocate()));
    });
}

/// Benchmark the stats snapshot against a populated store
fn bench_store_snapshot(c: &mut Criterion) {
    let store = JobStore::new();
    for i in 0..10_000u64 {
        store.allocate();
        store.record_timing(i % 500);
    }

    c.bench_function("store_snapshot_10k", |b| {
        b.iter(|| black_box(store.snapshot()));
    });
}

criterion_group!(
    benches,
    bench_digest,
    bench_store_allocate,
    bench_store_snapshot
);
criterion_main!(benches);
