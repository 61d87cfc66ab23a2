// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! A thin feed-forward network over the graph primitives.
//!
//! [`Network`] composes the core into a sigmoid multi-layer perceptron:
//! per layer a weight matrix and a bias row, chained lazily as
//! `sigmoid(a · W + b)` so the whole forward pass is one DAG rooted at the
//! output tensor. It exists to exercise the composition path end to end;
//! training loops and optimizers belong to the embedding application.

use crate::graph;
use tensor_core::{IsolateRef, TensorRef};

/// A fully-connected sigmoid network.
///
/// # Layout
/// Activations are single rows: the input is `[arch[0], 1]`. A layer from
/// width `p` to width `w` holds its weights as `[p, w]` — `w` rows of
/// length `p`, one row per output unit — and its bias as `[w, 1]`, so the
/// matrix product directly follows the kernel convention (every output
/// element is a dot product of the activation row with one weight row).
///
/// # Example
/// ```
/// use runtime::{init_runtime, ArenaCapacity, ComputeDevice, Isolate, Network};
///
/// init_runtime();
/// let iso = Isolate::create("net-doc", ComputeDevice::Cpu, ArenaCapacity::from_kib(64));
/// let net = Network::new(&iso, &[4, 8, 2]);
/// net.input().copy_from(&[0.1, 0.2, 0.3, 0.4]);
/// let out = net.forward();
/// assert_eq!(out.elem_count(), 2);
/// ```
pub struct Network {
    input: TensorRef,
    weights: Vec<TensorRef>,
    biases: Vec<TensorRef>,
    output: TensorRef,
}

impl Network {
    /// Builds the forward DAG for the given layer widths.
    ///
    /// Weights and biases start zeroed; use [`Network::randomize`] or fill
    /// them directly through the accessors.
    ///
    /// # Panics
    /// Panics unless `arch` names at least an input and an output layer.
    pub fn new(isolate: &IsolateRef, arch: &[usize]) -> Self {
        assert!(
            arch.len() >= 2,
            "network needs an input and an output layer, got {} widths",
            arch.len()
        );
        let input = isolate.new_tensor(&[arch[0], 1]);
        input.set_name("input");

        let mut weights = Vec::with_capacity(arch.len() - 1);
        let mut biases = Vec::with_capacity(arch.len() - 1);
        let mut activation = input.clone();
        for (i, &width) in arch.iter().enumerate().skip(1) {
            let prev = arch[i - 1];
            let w = isolate.new_tensor(&[prev, width]);
            w.set_name(&format!("weight {i}"));
            let b = isolate.new_tensor(&[width, 1]);
            b.set_name(&format!("bias {i}"));

            let z = &activation.matmul(&w) + &b;
            activation = z.sigmoid();
            activation.set_name(&format!("activation {i}"));

            weights.push(w);
            biases.push(b);
        }

        Self {
            input,
            weights,
            biases,
            output: activation,
        }
    }

    /// Fills every weight and bias with uniform values in `[-1, 1]` from a
    /// deterministic generator.
    pub fn randomize(&self, seed: u64) {
        for (i, w) in self.weights.iter().enumerate() {
            w.fill_random_seeded(-1.0, 1.0, seed.wrapping_add(i as u64));
        }
        for (i, b) in self.biases.iter().enumerate() {
            b.fill_random_seeded(-1.0, 1.0, seed.wrapping_add(0x8000 + i as u64));
        }
    }

    /// Returns the input leaf; fill it before calling [`Network::forward`].
    pub fn input(&self) -> &TensorRef {
        &self.input
    }

    /// Returns the output tensor of the forward DAG.
    pub fn output(&self) -> &TensorRef {
        &self.output
    }

    /// Returns the per-layer weight matrices.
    pub fn weights(&self) -> &[TensorRef] {
        &self.weights
    }

    /// Returns the per-layer bias rows.
    pub fn biases(&self) -> &[TensorRef] {
        &self.biases
    }

    /// Returns the number of trainable layers.
    pub fn num_layers(&self) -> usize {
        self.weights.len()
    }

    /// Evaluates the forward DAG and returns a handle to the output.
    pub fn forward(&self) -> TensorRef {
        graph::compute(&self.output);
        self.output.clone()
    }
}
