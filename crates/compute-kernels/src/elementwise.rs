// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! 4-D broadcasting element-wise kernels.
//!
//! The binary kernels compute `R = X ⊙ Y` where Y broadcasts onto X: along
//! every axis, Y's dimension divides X's and Y's values repeat. Rows of R
//! are partitioned across the compute context's threads; each row index is
//! unrolled into its `(i1, i2, i3)` coordinates and Y's coordinates follow
//! by modulo.
//!
//! Two code paths per row:
//! - **dense** — Y's columns are packed (`strides[0]` equals the element
//!   size), so the row is handled by a 1-D vector kernel over contiguous
//!   spans, repeating Y's row `X.dims[0] / Y.dims[0]` times;
//! - **sparse** — Y has a strided layout (a transposed or permuted view),
//!   so columns are walked one by one with an explicit modulo, addressing Y
//!   through its full stride triple.
//!
//! The unary kernels apply a 1-D activation row by row; their operands are
//! dense except possibly along axis 1, so each row is one contiguous span.
//!
//! R's storage must not overlap an operand's storage — the validators
//! enforce this before any dispatch, and the graph builder always
//! allocates fresh result tensors.

use crate::{vector, ComputeCtx};
use tensor_core::{Tensor, ELEM_SIZE};

/// 1-D kernel over three contiguous spans.
type VecOp = fn(&mut [f32], &[f32], &[f32]);

/// Scalar fallback for the sparse path.
type ScalarOp = fn(f32, f32) -> f32;

/// `R = X + Y` with Y broadcasting onto X.
pub fn add(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, y: &Tensor) {
    binary_broadcast(ctx, r, x, y, vector::add, |a, b| a + b);
}

/// `R = X - Y` with Y broadcasting onto X.
pub fn sub(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, y: &Tensor) {
    binary_broadcast(ctx, r, x, y, vector::sub, |a, b| a - b);
}

/// `R = X * Y` with Y broadcasting onto X.
pub fn mul(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, y: &Tensor) {
    binary_broadcast(ctx, r, x, y, vector::mul, |a, b| a * b);
}

/// `R = X / Y` with Y broadcasting onto X.
pub fn div(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, y: &Tensor) {
    binary_broadcast(ctx, r, x, y, vector::div, |a, b| a / b);
}

/// `R = exp(X)` (softmax numerator), row by row.
pub fn softmax(ctx: &ComputeCtx, r: &Tensor, x: &Tensor) {
    unary_rows(ctx, r, x, vector::softmax);
}

/// `R = sigmoid(X)`, row by row.
pub fn sigmoid(ctx: &ComputeCtx, r: &Tensor, x: &Tensor) {
    unary_rows(ctx, r, x, vector::sigmoid);
}

/// `R = tanh(X)`, row by row.
pub fn tanh(ctx: &ComputeCtx, r: &Tensor, x: &Tensor) {
    unary_rows(ctx, r, x, vector::tanh);
}

/// `R = relu(X)`, row by row.
pub fn relu(ctx: &ComputeCtx, r: &Tensor, x: &Tensor) {
    unary_rows(ctx, r, x, vector::relu);
}

/// `R = gelu(X)`, row by row.
pub fn gelu(ctx: &ComputeCtx, r: &Tensor, x: &Tensor) {
    unary_rows(ctx, r, x, vector::gelu);
}

/// `R = silu(X)`, row by row.
pub fn silu(ctx: &ComputeCtx, r: &Tensor, x: &Tensor) {
    unary_rows(ctx, r, x, vector::silu);
}

/// Shared skeleton of the four binary kernels.
fn binary_broadcast(
    ctx: &ComputeCtx,
    r: &Tensor,
    x: &Tensor,
    y: &Tensor,
    vec_op: VecOp,
    scalar_op: ScalarOp,
) {
    // Metadata is read once; the loops below touch only locals.
    let rd = *r.dims();
    let xd = *x.dims();
    let yd = *y.dims();
    let rs = *r.strides();
    let xs = *x.strides();
    let ys = *y.strides();
    let (pr, px, py) = (r.ptr(), x.ptr(), y.ptr());

    let cols = xd[0];
    let y_dense = ys[0] == ELEM_SIZE;
    let reps = cols / yd[0];

    let (begin, end) = ctx.row_span(r.shape().row_count());
    for row in begin..end {
        let i3 = row / (rd[1] * rd[2]);
        let rem = row - i3 * rd[1] * rd[2];
        let i2 = rem / rd[1];
        let i1 = rem - i2 * rd[1];
        // Broadcast coordinates into Y.
        let (y1, y2, y3) = (i1 % yd[1], i2 % yd[2], i3 % yd[3]);

        // SAFETY: the validators guarantee R and X share X's shape with
        // packed columns, Y repeats onto X, and every offset computed from
        // the stride triples stays inside its tensor's storage. Thread
        // row-spans are disjoint, so this invocation is the only writer of
        // these rows of R.
        unsafe {
            let r_row = pr.add(i1 * rs[1] + i2 * rs[2] + i3 * rs[3]) as *mut f32;
            let x_row = px.add(i1 * xs[1] + i2 * xs[2] + i3 * xs[3]) as *const f32;
            if y_dense {
                let y_row = py.add(y1 * ys[1] + y2 * ys[2] + y3 * ys[3]) as *const f32;
                let dst = std::slice::from_raw_parts_mut(r_row, cols);
                let src = std::slice::from_raw_parts(x_row, cols);
                let yrow = std::slice::from_raw_parts(y_row, yd[0]);
                for rep in 0..reps {
                    let lo = rep * yd[0];
                    let hi = lo + yd[0];
                    vec_op(&mut dst[lo..hi], &src[lo..hi], yrow);
                }
            } else {
                for i0 in 0..cols {
                    let y0 = i0 % yd[0];
                    let yv = *(py.add(y0 * ys[0] + y1 * ys[1] + y2 * ys[2] + y3 * ys[3])
                        as *const f32);
                    *r_row.add(i0) = scalar_op(*x_row.add(i0), yv);
                }
            }
        }
    }
}

/// Shared skeleton of the six unary kernels.
fn unary_rows(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, vec_fn: fn(&mut [f32], &[f32])) {
    let cols = x.col_count();
    let xs1 = x.strides()[1];
    let rs1 = r.strides()[1];
    let (px, pr) = (x.ptr(), r.ptr());

    let (begin, end) = ctx.row_span(x.shape().row_count());
    for row in begin..end {
        // SAFETY: both tensors are dense except possibly along axis 1
        // (validated), so row `row` is one contiguous span of `cols`
        // elements at byte offset `row * strides[1]`.
        unsafe {
            let dst = std::slice::from_raw_parts_mut(pr.add(row * rs1) as *mut f32, cols);
            let src = std::slice::from_raw_parts(px.add(row * xs1) as *const f32, cols);
            vec_fn(dst, src);
        }
    }
}
