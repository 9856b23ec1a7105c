//! Criterion benchmarks for rust_logger_tree

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rust_logger_tree::core::{args_to_attrs, caller};
use rust_logger_tree::prelude::*;
use std::io;

// ============================================================================
// Tree Construction Benchmarks
// ============================================================================

fn bench_tree_construction(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_construction");
    group.throughput(Throughput::Elements(1));

    group.bench_function("root", |b| {
        b.iter(|| {
            let logger = Logger::new();
            black_box(logger)
        });
    });

    let root = Logger::new();
    group.bench_function("child_no_handlers", |b| {
        b.iter(|| black_box(root.child()));
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(1));

    let bare = Logger::new();
    group.bench_function("no_handlers", |b| {
        b.iter(|| bare.info(black_box("message"), args![]));
    });

    let json = Logger::builder()
        .handler(JsonHandler::new(io::sink(), LogLevel::Debug))
        .build();
    group.bench_function("json_sink", |b| {
        b.iter(|| json.info(black_box("message"), args!["user", "ada", "attempt", 3]));
    });

    let filtered = Logger::builder()
        .handler(JsonHandler::new(io::sink(), LogLevel::Error))
        .build();
    group.bench_function("json_filtered", |b| {
        b.iter(|| filtered.debug(black_box("message"), args![]));
    });

    let pretty = Logger::builder()
        .handler(PrettyHandler::new(io::sink(), LogLevel::Debug))
        .build();
    group.bench_function("pretty_sink", |b| {
        b.iter(|| pretty.info(black_box("message"), args!["user", "ada", "attempt", 3]));
    });

    group.finish();
}

fn bench_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_depth");

    for depth in [0usize, 4, 16] {
        let root = Logger::builder()
            .handler(JsonHandler::new(io::sink(), LogLevel::Debug))
            .build();
        let mut leaf = root.clone();
        for _ in 0..depth {
            leaf = leaf.child();
        }

        group.bench_with_input(BenchmarkId::from_parameter(depth), &leaf, |b, leaf| {
            b.iter(|| leaf.info(black_box("message"), args![]));
        });
    }

    group.finish();
}

// ============================================================================
// Building Block Benchmarks
// ============================================================================

fn bench_caller_resolution(c: &mut Criterion) {
    c.bench_function("caller_resolve", |b| {
        b.iter(|| black_box(caller::resolve()));
    });
}

fn bench_attribute_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("args_to_attrs");

    for pairs in [1usize, 8, 32] {
        let args: Vec<Value> = (0..pairs)
            .flat_map(|i| [Value::from(format!("key{}", i)), Value::from(i)])
            .collect();

        group.throughput(Throughput::Elements(pairs as u64));
        group.bench_with_input(BenchmarkId::from_parameter(pairs), &args, |b, args| {
            b.iter(|| black_box(args_to_attrs(args.clone())));
        });
    }

    group.finish();
}

fn bench_close(c: &mut Criterion) {
    c.bench_function("close_subtree_64", |b| {
        b.iter_batched(
            || {
                let root = Logger::new();
                for _ in 0..8 {
                    let child = root.child();
                    for _ in 0..7 {
                        child.child();
                    }
                }
                root
            },
            |root| root.close(),
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(
    benches,
    bench_tree_construction,
    bench_dispatch,
    bench_depth,
    bench_caller_resolution,
    bench_attribute_parsing,
    bench_close,
);

criterion_main!(benches);
