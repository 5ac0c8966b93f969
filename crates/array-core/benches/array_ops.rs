// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for matrix multiply kernels and broadcasting arithmetic.

use array_core::{Array, ParallelKernel, ReferenceKernel};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn square(n: usize) -> Array {
    let mut x = 0u32;
    Array::from_fn([n, n], move || {
        x = x.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        (x >> 16) as f32 / 65_536.0
    })
}

fn bench_matmul(c: &mut Criterion) {
    let parallel = ParallelKernel::new(
        std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4),
        0,
    )
    .expect("thread pool");
    let mut group = c.benchmark_group("matmul");
    for n in [64, 128, 256] {
        let a = square(n);
        let bt = square(n).transpose();
        group.bench_with_input(BenchmarkId::new("reference", n), &n, |bench, _| {
            bench.iter(|| black_box(a.dot_with(&bt, &ReferenceKernel).unwrap()))
        });
        group.bench_with_input(BenchmarkId::new("parallel", n), &n, |bench, _| {
            bench.iter(|| black_box(a.dot_with(&bt, &parallel).unwrap()))
        });
    }
    group.finish();
}

fn bench_broadcast_add(c: &mut Criterion) {
    let a = Array::from_fn([64, 32, 32], || 1.0);
    let b = Array::from_fn([32, 32], || 2.0);
    c.bench_function("broadcast_add_64x32x32", |bench| {
        bench.iter(|| black_box(a.add(&b).unwrap()))
    });
}

criterion_group!(benches, bench_matmul, bench_broadcast_add);
criterion_main!(benches);
