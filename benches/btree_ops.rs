// Copyright 2025 Vivian Voss. Licensed under the Apache License, Version 2.0.
// SPDX-License-Identifier: Apache-2.0

//! Core Tree operation benchmarks.
//!
//! Measures performance of:
//! - add() - Insert a single value, including any cascading split
//! - find() - Equality lookup
//! - iter() - Full in-order traversal
//!
//! ## Performance targets
//! - add: sub-millisecond per value up to tens of thousands of keys
//! - find: roughly O(log n) in tree height, independent of total size
//! - iter: linear in the number of live keys

use btreeindex::{Config, Tree};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tempfile::TempDir;

const DEGREE: u16 = 32;

fn filled_tree(size: i64) -> Tree<i64> {
    let tree: Tree<i64> = Tree::open(Config::new(DEGREE)).unwrap();
    tree.add(0..size).unwrap();
    tree
}

/// Benchmark add() as the tree grows, including cascading splits.
///
/// Target: sub-millisecond per insert up to tens of thousands of keys
fn bench_add(c: &mut Criterion) {
    let mut group = c.benchmark_group("add");

    for size in [100, 1_000, 10_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &count| {
            b.iter_batched(
                || Tree::<i64>::open(Config::new(DEGREE)).unwrap(),
                |tree| {
                    for v in 0..count {
                        black_box(tree.add([v]).unwrap());
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark find() against a prebuilt tree of the given size.
///
/// Target: lookup time roughly constant in tree size (O(log n) descent)
fn bench_find(c: &mut Criterion) {
    let mut group = c.benchmark_group("find");

    for size in [100, 1_000, 10_000, 100_000].iter() {
        let tree = filled_tree(*size);
        let target = size / 2;

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                black_box(tree.find(&target).unwrap());
            });
        });
    }

    group.finish();
}

/// Benchmark a full in-order traversal.
///
/// Target: linear in the number of live keys
fn bench_iter(c: &mut Criterion) {
    let mut group = c.benchmark_group("iter");

    for size in [100, 1_000, 10_000].iter() {
        let tree = filled_tree(*size);

        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                for value in tree.iter().unwrap() {
                    black_box(value.unwrap());
                }
            });
        });
    }

    group.finish();
}

/// Benchmark add() against a persisted tree (storage file growing on
/// every flushed split), to surface the cost the in-memory-only
/// benchmarks above do not: append I/O per flushed node.
///
/// Target: within a small constant factor of the in-memory add() cost
fn bench_add_persisted(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_persisted");
    group.sample_size(20); // touches the filesystem per iteration

    for size in [100, 1_000].iter() {
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &count| {
            b.iter_batched(
                || {
                    let dir = TempDir::new().unwrap();
                    let tree: Tree<i64> =
                        Tree::open(Config::new(DEGREE).metadata(dir.path().join("bench.meta"))).unwrap();
                    (tree, dir)
                },
                |(tree, _dir)| {
                    for v in 0..count {
                        black_box(tree.add([v]).unwrap());
                    }
                    tree.flush().unwrap();
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }

    group.finish();
}

/// Benchmark concurrent iteration alongside a single writer thread, to
/// confirm the restart-safe iterator's reads do not serialize behind
/// `writeMonitor`.
///
/// Target: throughput close to the single-threaded iterate cost
fn bench_concurrent_iteration(c: &mut Criterion) {
    use std::sync::Arc;
    use std::thread;

    let tree = Arc::new(filled_tree(10_000));

    c.bench_function("concurrent_iteration", |b| {
        b.iter(|| {
            let mut handles = Vec::new();
            for _ in 0..4 {
                let tree = Arc::clone(&tree);
                handles.push(thread::spawn(move || {
                    for value in tree.iter().unwrap() {
                        black_box(value.unwrap());
                    }
                }));
            }
            for handle in handles {
                handle.join().unwrap();
            }
        });
    });
}

criterion_group!(
    benches,
    bench_add,
    bench_find,
    bench_iter,
    bench_add_persisted,
    bench_concurrent_iteration
);
criterion_main!(benches);
