// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! 1-D scalar kernels over contiguous float ranges.
//!
//! These are the innermost loops of the runtime: plain element-wise
//! arithmetic, the widening dot product, and the six activations. The
//! broadcasting tensor kernels and the blocked SGEMM dispatch here for
//! every contiguous span they touch.

/// Coefficient `sqrt(2/π)` of the GELU tanh approximation.
const SQRT_2_OVER_PI: f32 = 0.797_884_56;

/// Cubic coefficient of the GELU tanh approximation.
const GELU_COEFF: f32 = 0.044_715;

/// `out[i] = x[i] + y[i]`.
pub fn add(out: &mut [f32], x: &[f32], y: &[f32]) {
    for i in 0..out.len() {
        out[i] = x[i] + y[i];
    }
}

/// `out[i] = x[i] - y[i]`.
pub fn sub(out: &mut [f32], x: &[f32], y: &[f32]) {
    for i in 0..out.len() {
        out[i] = x[i] - y[i];
    }
}

/// `out[i] = x[i] * y[i]`.
pub fn mul(out: &mut [f32], x: &[f32], y: &[f32]) {
    for i in 0..out.len() {
        out[i] = x[i] * y[i];
    }
}

/// `out[i] = x[i] / y[i]`. Division by zero follows IEEE-754 (±inf, NaN).
pub fn div(out: &mut [f32], x: &[f32], y: &[f32]) {
    for i in 0..out.len() {
        out[i] = x[i] / y[i];
    }
}

/// Dot product `Σ x[i]·y[i]`.
///
/// Accumulates in f64 and narrows once at the end. The widening is a
/// bit-level requirement, not an optimization: tests compare against the
/// f64 reference exactly.
pub fn dot(x: &[f32], y: &[f32]) -> f32 {
    let mut sum = 0.0f64;
    for i in 0..x.len() {
        sum += (x[i] * y[i]) as f64;
    }
    sum as f32
}

/// Softmax numerator `exp(x)` for one value.
///
/// The normalizing divisor is the caller's phase; this kernel computes the
/// exponential only.
#[inline(always)]
pub fn softmax_scalar(x: f32) -> f32 {
    x.exp()
}

/// Logistic sigmoid `1 / (1 + exp(-x))` for one value.
#[inline(always)]
pub fn sigmoid_scalar(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Hyperbolic tangent for one value.
#[inline(always)]
pub fn tanh_scalar(x: f32) -> f32 {
    x.tanh()
}

/// Rectified linear unit `max(x, 0)` for one value.
#[inline(always)]
pub fn relu_scalar(x: f32) -> f32 {
    x.max(0.0)
}

/// GELU via the tanh approximation for one value:
/// `0.5·x·(1 + tanh(sqrt(2/π)·(x + 0.044715·x³)))`.
#[inline(always)]
pub fn gelu_scalar(x: f32) -> f32 {
    0.5 * x * (1.0 + (SQRT_2_OVER_PI * (x + GELU_COEFF * x * x * x)).tanh())
}

/// SiLU (sigmoid-weighted linear unit) `x / (1 + exp(-x))` for one value.
#[inline(always)]
pub fn silu_scalar(x: f32) -> f32 {
    x / (1.0 + (-x).exp())
}

/// `out[i] = exp(x[i])`.
pub fn softmax(out: &mut [f32], x: &[f32]) {
    for i in 0..out.len() {
        out[i] = softmax_scalar(x[i]);
    }
}

/// `out[i] = sigmoid(x[i])`.
pub fn sigmoid(out: &mut [f32], x: &[f32]) {
    for i in 0..out.len() {
        out[i] = sigmoid_scalar(x[i]);
    }
}

/// `out[i] = tanh(x[i])`.
pub fn tanh(out: &mut [f32], x: &[f32]) {
    for i in 0..out.len() {
        out[i] = tanh_scalar(x[i]);
    }
}

/// `out[i] = relu(x[i])`.
pub fn relu(out: &mut [f32], x: &[f32]) {
    for i in 0..out.len() {
        out[i] = relu_scalar(x[i]);
    }
}

/// `out[i] = gelu(x[i])`.
pub fn gelu(out: &mut [f32], x: &[f32]) {
    for i in 0..out.len() {
        out[i] = gelu_scalar(x[i]);
    }
}

/// `out[i] = silu(x[i])`.
pub fn silu(out: &mut [f32], x: &[f32]) {
    for i in 0..out.len() {
        out[i] = silu_scalar(x[i]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const N: usize = 1 << 16;

    fn random_pair(seed: u64) -> (Vec<f32>, Vec<f32>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let a: Vec<f32> = (0..N).map(|_| rng.gen_range(-1.0f32..=1.0)).collect();
        let b: Vec<f32> = (0..N).map(|_| rng.gen_range(-1.0f32..=1.0)).collect();
        (a, b)
    }

    #[test]
    fn test_add() {
        let (a, b) = random_pair(1);
        let mut c = vec![0.0f32; N];
        add(&mut c, &a, &b);
        for i in 0..N {
            assert_eq!(c[i], a[i] + b[i]);
        }
    }

    #[test]
    fn test_sub() {
        let (a, b) = random_pair(2);
        let mut c = vec![0.0f32; N];
        sub(&mut c, &a, &b);
        for i in 0..N {
            assert_eq!(c[i], a[i] - b[i]);
        }
    }

    #[test]
    fn test_mul() {
        let (a, b) = random_pair(3);
        let mut c = vec![0.0f32; N];
        mul(&mut c, &a, &b);
        for i in 0..N {
            assert_eq!(c[i], a[i] * b[i]);
        }
    }

    #[test]
    fn test_div() {
        let (a, mut b) = random_pair(4);
        for y in &mut b {
            if *y == 0.0 {
                *y = 0.5;
            }
        }
        let mut c = vec![0.0f32; N];
        div(&mut c, &a, &b);
        for i in 0..N {
            assert_eq!(c[i], a[i] / b[i]);
        }
    }

    #[test]
    fn test_div_by_zero_is_ieee() {
        let mut c = vec![0.0f32; 3];
        div(&mut c, &[1.0, -1.0, 0.0], &[0.0, 0.0, 0.0]);
        assert_eq!(c[0], f32::INFINITY);
        assert_eq!(c[1], f32::NEG_INFINITY);
        assert!(c[2].is_nan());
    }

    #[test]
    fn test_dot_widening() {
        let (a, b) = random_pair(5);
        let r = dot(&a, &b);
        let mut acc = 0.0f64;
        for i in 0..N {
            acc += (a[i] * b[i]) as f64;
        }
        // Bit-exact: the kernel must match the f64 reference, not merely
        // approximate it.
        assert_eq!(r, acc as f32);
    }

    #[test]
    fn test_dot_orthogonal() {
        assert_eq!(dot(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn test_softmax_is_exp_only() {
        let mut out = vec![0.0f32; 3];
        softmax(&mut out, &[0.0, 1.0, -1.0]);
        assert_eq!(out[0], 1.0);
        assert_eq!(out[1], 1.0f32.exp());
        assert_eq!(out[2], (-1.0f32).exp());
    }

    #[test]
    fn test_sigmoid() {
        assert_eq!(sigmoid_scalar(0.0), 0.5);
        assert!((sigmoid_scalar(4.0) - 0.98201376).abs() < 1e-6);
        assert!(sigmoid_scalar(-30.0) < 1e-12);
    }

    #[test]
    fn test_tanh() {
        assert_eq!(tanh_scalar(0.0), 0.0);
        assert!((tanh_scalar(1.0) - 0.7615942).abs() < 1e-6);
    }

    #[test]
    fn test_relu() {
        let mut out = vec![0.0f32; 4];
        relu(&mut out, &[-2.0, -0.0, 0.5, 3.0]);
        assert_eq!(out, vec![0.0, 0.0, 0.5, 3.0]);
    }

    #[test]
    fn test_gelu_known_values() {
        assert_eq!(gelu_scalar(0.0), 0.0);
        assert!((gelu_scalar(1.0) - 0.8412).abs() < 1e-3);
        assert!((gelu_scalar(-1.0) + 0.1588).abs() < 1e-3);
        // Saturates towards identity / zero.
        assert!((gelu_scalar(3.0) - 3.0).abs() < 0.01);
        assert!(gelu_scalar(-3.0).abs() < 0.01);
    }

    #[test]
    fn test_silu_known_values() {
        assert_eq!(silu_scalar(0.0), 0.0);
        assert!((silu_scalar(1.0) - 0.7310586).abs() < 1e-6);
        assert!((silu_scalar(-1.0) + 0.26894143).abs() < 1e-6);
    }

    #[test]
    fn test_activation_overflow_is_ieee() {
        // exp overflow produces +inf, not a trap.
        let mut out = vec![0.0f32; 1];
        softmax(&mut out, &[1000.0]);
        assert_eq!(out[0], f32::INFINITY);
    }
}
