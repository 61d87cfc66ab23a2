// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for the kernel hot paths.

use compute_kernels::{elementwise, gemm, vector, ComputeCtx};
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tensor_arena::ArenaCapacity;
use tensor_core::{init_runtime, ComputeDevice, Isolate};

fn bench_vector(c: &mut Criterion) {
    let n = 1 << 14;
    let a = vec![1.5f32; n];
    let b = vec![0.5f32; n];
    let mut out = vec![0.0f32; n];

    c.bench_function("vector_add_16k", |bench| {
        bench.iter(|| vector::add(black_box(&mut out), black_box(&a), black_box(&b)));
    });
    c.bench_function("vector_dot_16k", |bench| {
        bench.iter(|| vector::dot(black_box(&a), black_box(&b)));
    });
}

fn bench_broadcast_add(c: &mut Criterion) {
    init_runtime();
    let iso = Isolate::create("bench-broadcast", ComputeDevice::Cpu, ArenaCapacity::from_mib(16));
    let ctx = ComputeCtx::single_threaded();
    let x = iso.new_tensor(&[64, 64, 4, 1]);
    let y = iso.new_tensor(&[64, 1, 1, 1]);
    let r = iso.new_tensor(&[64, 64, 4, 1]);
    x.fill_random_seeded(-1.0, 1.0, 1);
    y.fill_random_seeded(-1.0, 1.0, 2);

    c.bench_function("broadcast_add_64x64x4", |bench| {
        bench.iter(|| elementwise::add(black_box(&ctx), black_box(&r), black_box(&x), black_box(&y)));
    });
}

fn bench_matmul(c: &mut Criterion) {
    init_runtime();
    let iso = Isolate::create("bench-matmul", ComputeDevice::Cpu, ArenaCapacity::from_mib(16));
    let ctx = ComputeCtx::single_threaded();
    let x = iso.new_tensor(&[128, 128]);
    let y = iso.new_tensor(&[128, 128]);
    let r = iso.new_tensor(&[128, 128]);
    x.fill_random_seeded(-1.0, 1.0, 3);
    y.fill_random_seeded(-1.0, 1.0, 4);

    c.bench_function("matmul_naive_128", |bench| {
        bench.iter(|| gemm::matmul(black_box(&ctx), black_box(&r), black_box(&x), black_box(&y)));
    });
    c.bench_function("matmul_blocked_128", |bench| {
        bench.iter(|| {
            gemm::matmul_blocked(black_box(&ctx), black_box(&r), black_box(&x), black_box(&y))
        });
    });
}

criterion_group!(benches, bench_vector, bench_broadcast_add, bench_matmul);
criterion_main!(benches);
