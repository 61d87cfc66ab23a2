// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Eager operation surface.
//!
//! One free function per opcode (except `nop`), each running the validator
//! and the kernel directly against a caller-provided result tensor — no
//! graph node is recorded. This is the imperative twin of the lazy
//! handle operators: the caller owns result placement and threading.
//!
//! # Example
//! ```
//! use compute_kernels::ComputeCtx;
//! use runtime::{init_runtime, ops, ArenaCapacity, ComputeDevice, Isolate};
//!
//! init_runtime();
//! let iso = Isolate::create("ops-doc", ComputeDevice::Cpu, ArenaCapacity::from_kib(16));
//! let x = iso.new_tensor_with_data(&[2], &[1.0, 2.0]);
//! let y = iso.new_tensor_with_data(&[2], &[3.0, 4.0]);
//! let r = iso.new_tensor(&[2]);
//! ops::add(&ComputeCtx::single_threaded(), &r, &x, &y);
//! assert_eq!(r.data(), &[4.0, 6.0]);
//! ```

use crate::validate::{enforce, validate_binary, validate_matmul, validate_unary};
use compute_kernels::{elementwise, gemm, ComputeCtx};
use tensor_core::{OpCode, TensorRef};

/// `R = X + Y`, validated and computed eagerly.
pub fn add(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef, y: &TensorRef) {
    enforce(validate_binary(OpCode::Add, r, x, y));
    elementwise::add(ctx, r, x, y);
}

/// `R = X - Y`, validated and computed eagerly.
pub fn sub(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef, y: &TensorRef) {
    enforce(validate_binary(OpCode::Sub, r, x, y));
    elementwise::sub(ctx, r, x, y);
}

/// `R = X * Y`, validated and computed eagerly.
pub fn mul(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef, y: &TensorRef) {
    enforce(validate_binary(OpCode::Mul, r, x, y));
    elementwise::mul(ctx, r, x, y);
}

/// `R = X / Y`, validated and computed eagerly.
pub fn div(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef, y: &TensorRef) {
    enforce(validate_binary(OpCode::Div, r, x, y));
    elementwise::div(ctx, r, x, y);
}

/// `R = X · Y` (SGEMM), validated and computed eagerly.
pub fn matmul(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef, y: &TensorRef) {
    enforce(validate_matmul(r, x, y));
    gemm::matmul(ctx, r, x, y);
}

/// `R = exp(X)` (softmax numerator), validated and computed eagerly.
pub fn softmax(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef) {
    enforce(validate_unary(OpCode::Softmax, r, x));
    elementwise::softmax(ctx, r, x);
}

/// `R = sigmoid(X)`, validated and computed eagerly.
pub fn sigmoid(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef) {
    enforce(validate_unary(OpCode::Sigmoid, r, x));
    elementwise::sigmoid(ctx, r, x);
}

/// `R = tanh(X)`, validated and computed eagerly.
pub fn tanh(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef) {
    enforce(validate_unary(OpCode::Tanh, r, x));
    elementwise::tanh(ctx, r, x);
}

/// `R = relu(X)`, validated and computed eagerly.
pub fn relu(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef) {
    enforce(validate_unary(OpCode::Relu, r, x));
    elementwise::relu(ctx, r, x);
}

/// `R = gelu(X)`, validated and computed eagerly.
pub fn gelu(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef) {
    enforce(validate_unary(OpCode::Gelu, r, x));
    elementwise::gelu(ctx, r, x);
}

/// `R = silu(X)`, validated and computed eagerly.
pub fn silu(ctx: &ComputeCtx, r: &TensorRef, x: &TensorRef) {
    enforce(validate_unary(OpCode::Silu, r, x));
    elementwise::silu(ctx, r, x);
}
