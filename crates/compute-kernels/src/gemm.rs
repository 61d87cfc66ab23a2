// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! SGEMM: single-precision matrix multiply.
//!
//! Both operands carry the reduction axis K as their leading (contiguous)
//! axis: `X` is `[K, M, …]` (M rows of length K) and `Y` is `[K, N, …]`
//! (N rows of length K). The result is `[N, M, …]` and every element is a
//! dot product of one X row with one Y row:
//!
//! ```text
//! R(n, m, i2, i3) = Σ_k X(k, m, i2 % X.d2, i3 % X.d3) · Y(k, n, i2, i3)
//! ```
//!
//! Axes 2 and 3 broadcast from X onto Y; accumulation is in f64 and
//! narrows once per output element.
//!
//! Two forms:
//! - [`matmul`] — the reference: a plain loop nest over `(i3, i2, m, n)`,
//!   thread-partitioned over X-rows.
//! - [`matmul_blocked`] — optional fast path: tiles the X-row × Y-row
//!   product with fixed-size square blocks for cache reuse and dispatches
//!   the 1-D dot kernel per pair. Produces the same result.

use crate::{vector, ComputeCtx};
use tensor_core::Tensor;

/// Tile edge of the blocked form. Any power of two ≥ 4 works; 16 keeps a
/// pair of row blocks inside L1 for typical K.
const BLOCK: usize = 16;

/// Naive SGEMM, the reference form.
pub fn matmul(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, y: &Tensor) {
    let xd = *x.dims();
    let yd = *y.dims();
    let rs = *r.strides();
    let xs = *x.strides();
    let ys = *y.strides();
    let (pr, px, py) = (r.ptr(), x.ptr(), y.ptr());

    let k = xd[0];
    let m = xd[1];
    let n = yd[1];

    let (m_begin, m_end) = ctx.row_span(m);
    for i3 in 0..yd[3] {
        for i2 in 0..yd[2] {
            let x2 = i2 % xd[2];
            let x3 = i3 % xd[3];
            for mi in m_begin..m_end {
                // SAFETY: the matmul validator guarantees packed leading
                // axes on X and Y, a dense result of shape [N, M] with Y's
                // outer axes, and integer broadcast ratios; every offset
                // below therefore stays inside its tensor. Distinct thread
                // indices write disjoint mi ranges of R.
                unsafe {
                    let x_row = std::slice::from_raw_parts(
                        px.add(mi * xs[1] + x2 * xs[2] + x3 * xs[3]) as *const f32,
                        k,
                    );
                    for ni in 0..n {
                        let y_row = std::slice::from_raw_parts(
                            py.add(ni * ys[1] + i2 * ys[2] + i3 * ys[3]) as *const f32,
                            k,
                        );
                        let dst =
                            pr.add(ni * rs[0] + mi * rs[1] + i2 * rs[2] + i3 * rs[3]) as *mut f32;
                        *dst = vector::dot(x_row, y_row);
                    }
                }
            }
        }
    }
}

/// Blocked SGEMM, the optional fast path.
///
/// Walks the X-row × Y-row Cartesian product in [`BLOCK`]² tiles so both
/// row blocks stay cache-resident, dispatching the 1-D dot kernel for each
/// pair. Thread partitioning splits the X-row axis, as in [`matmul`].
pub fn matmul_blocked(ctx: &ComputeCtx, r: &Tensor, x: &Tensor, y: &Tensor) {
    let xd = *x.dims();
    let yd = *y.dims();
    let rs = *r.strides();
    let xs = *x.strides();
    let ys = *y.strides();
    let (pr, px, py) = (r.ptr(), x.ptr(), y.ptr());

    let k = xd[0];
    let m = xd[1];
    let n = yd[1];

    let (m_begin, m_end) = ctx.row_span(m);
    for i3 in 0..yd[3] {
        for i2 in 0..yd[2] {
            let x2 = i2 % xd[2];
            let x3 = i3 % xd[3];
            let mut mb = m_begin;
            while mb < m_end {
                let mt = (mb + BLOCK).min(m_end);
                let mut nb = 0;
                while nb < n {
                    let nt = (nb + BLOCK).min(n);
                    for mi in mb..mt {
                        // SAFETY: as in `matmul`; the tile bounds never
                        // exceed the row counts.
                        unsafe {
                            let x_row = std::slice::from_raw_parts(
                                px.add(mi * xs[1] + x2 * xs[2] + x3 * xs[3]) as *const f32,
                                k,
                            );
                            for ni in nb..nt {
                                let y_row = std::slice::from_raw_parts(
                                    py.add(ni * ys[1] + i2 * ys[2] + i3 * ys[3]) as *const f32,
                                    k,
                                );
                                let dst = pr.add(ni * rs[0] + mi * rs[1] + i2 * rs[2] + i3 * rs[3])
                                    as *mut f32;
                                *dst = vector::dot(x_row, y_row);
                            }
                        }
                    }
                    nb = nt;
                }
                mb = mt;
            }
        }
    }
}
