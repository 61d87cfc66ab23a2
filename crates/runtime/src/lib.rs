// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # runtime
//!
//! The public surface of the tensor runtime: per-opcode validators, the
//! memoized post-order graph evaluator, the eager operation functions, a
//! TOML-backed configuration type, and a thin feed-forward network that
//! exercises the whole stack.
//!
//! Everything a consumer needs re-exports from here:
//!
//! ```
//! use runtime::{compute, init_runtime, ArenaCapacity, ComputeDevice, Isolate};
//!
//! init_runtime();
//! let iso = Isolate::create("readme", ComputeDevice::AutoSelect, ArenaCapacity::from_mib(1));
//! let a = iso.new_tensor_with_data(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
//! let b = iso.new_tensor_with_data(&[2, 2], &[0.5, 0.5, 0.5, 0.5]);
//! let c = (&a * &b).relu();
//! compute(&c);
//! assert_eq!(c.data(), &[0.5, 1.0, 1.5, 2.0]);
//! ```
//!
//! # Error Handling
//! Two classes only. Programming errors — violated validator predicates,
//! arena exhaustion, misuse of the lifecycle — log a diagnostic through
//! `tracing` and panic; they are never surfaced as `Result`s. Numerical
//! edge cases follow IEEE-754 (division by zero, activation overflow).
//! The only `Result`-bearing surface is configuration parsing
//! ([`RuntimeConfig`], [`RuntimeError`]).

mod config;
mod error;
pub mod graph;
mod net;
pub mod ops;
mod validate;

pub use compute_kernels::{elementwise, gemm, vector, ComputeCtx};
pub use config::RuntimeConfig;
pub use error::RuntimeError;
pub use graph::{compute, compute_with_order, EvalOrder};
pub use net::Network;
pub use tensor_arena::{Arena, ArenaCapacity, ArenaStats};
pub use tensor_core::{
    init_runtime, runtime_initialized, shutdown_runtime, ComputeDevice, Isolate, IsolateRef,
    OpCode, Shape, Tensor, TensorRef, ELEM_SIZE, MAX_DIMS, MAX_NAME, MAX_OPERANDS,
};
pub use validate::{validate_binary, validate_matmul, validate_node, validate_unary, ValidationError};
