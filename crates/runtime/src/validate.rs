// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Per-opcode validators.
//!
//! One predicate per opcode, run before every kernel dispatch. The
//! predicates return a [`ValidationError`] naming the failed check and the
//! offending tensors so callers can log a useful diagnostic — but a failure
//! observed at evaluation time is a programming error and is escalated to a
//! panic by [`enforce`], in release builds as well as debug.
//!
//! Operand null-ness has no predicate here: handles cannot be null by
//! construction, which discharges that entire class of checks at the type
//! level.

use tensor_core::{OpCode, Tensor, ELEM_SIZE};

/// A validator predicate that did not hold.
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// The node records a different operand count than its opcode's arity.
    #[error("'{op}' expects {expected} operands, node records {actual}")]
    OperandCount {
        op: OpCode,
        expected: usize,
        actual: usize,
    },

    /// A shape or layout predicate failed.
    #[error("'{op}' validation failed: {predicate} — {tensors}")]
    Predicate {
        op: OpCode,
        /// The predicate, spelled as in the shape algebra.
        predicate: &'static str,
        /// Display of the tensors involved.
        tensors: String,
    },
}

/// `true` when two tensors' storage byte ranges overlap.
///
/// A kernel writes its result while reading its operands; overlapping
/// storage would alias a writer with a reader, which the memory model of
/// the kernels forbids.
fn storage_overlaps(a: &Tensor, b: &Tensor) -> bool {
    let (a0, a1) = (a.ptr() as usize, a.ptr() as usize + a.size_bytes());
    let (b0, b1) = (b.ptr() as usize, b.ptr() as usize + b.size_bytes());
    a0 < b1 && b0 < a1
}

fn predicate_error(
    op: OpCode,
    predicate: &'static str,
    tensors: &[(&str, &Tensor)],
) -> ValidationError {
    let tensors = tensors
        .iter()
        .map(|(label, t)| format!("{label}: {t}"))
        .collect::<Vec<_>>()
        .join("; ");
    ValidationError::Predicate {
        op,
        predicate,
        tensors,
    }
}

/// Checks a unary activation: result and source share one shape and both
/// are dense except possibly along axis 1.
pub fn validate_unary(op: OpCode, r: &Tensor, x: &Tensor) -> Result<(), ValidationError> {
    if !x.shape().is_dense_except_dim1() {
        return Err(predicate_error(op, "x.is_dense_except_dim1()", &[("X", x)]));
    }
    if !r.shape().is_dense_except_dim1() {
        return Err(predicate_error(op, "r.is_dense_except_dim1()", &[("R", r)]));
    }
    if r.shape() != x.shape() {
        return Err(predicate_error(
            op,
            "r.shape() == x.shape()",
            &[("R", r), ("X", x)],
        ));
    }
    if storage_overlaps(r, x) {
        return Err(predicate_error(
            op,
            "r storage disjoint from x",
            &[("R", r), ("X", x)],
        ));
    }
    Ok(())
}

/// Checks a binary element-wise op: packed columns on X and R, Y repeats
/// onto X, and R shares X's shape.
pub fn validate_binary(op: OpCode, r: &Tensor, x: &Tensor, y: &Tensor) -> Result<(), ValidationError> {
    if x.strides()[0] != ELEM_SIZE {
        return Err(predicate_error(op, "x.strides()[0] == ELEM_SIZE", &[("X", x)]));
    }
    if r.strides()[0] != ELEM_SIZE {
        return Err(predicate_error(op, "r.strides()[0] == ELEM_SIZE", &[("R", r)]));
    }
    if !y.shape().can_repeat(x.shape()) {
        return Err(predicate_error(
            op,
            "y.can_repeat(x)",
            &[("Y", y), ("X", x)],
        ));
    }
    if x.shape() != r.shape() {
        return Err(predicate_error(
            op,
            "x.shape() == r.shape()",
            &[("X", x), ("R", r)],
        ));
    }
    if storage_overlaps(r, x) || storage_overlaps(r, y) {
        return Err(predicate_error(
            op,
            "r storage disjoint from x and y",
            &[("R", r), ("X", x), ("Y", y)],
        ));
    }
    Ok(())
}

/// Checks a matrix multiply: shared leading reduction axis, integer outer
/// broadcast ratios, packed rows on both operands, and a result of shape
/// `[N, M]` carrying Y's outer axes.
pub fn validate_matmul(r: &Tensor, x: &Tensor, y: &Tensor) -> Result<(), ValidationError> {
    let op = OpCode::MatMul;
    if !x.shape().is_matmul_compatible(y.shape()) {
        return Err(predicate_error(
            op,
            "x.is_matmul_compatible(y)",
            &[("X", x), ("Y", y)],
        ));
    }
    if x.strides()[0] != ELEM_SIZE {
        return Err(predicate_error(op, "x.strides()[0] == ELEM_SIZE", &[("X", x)]));
    }
    if y.strides()[0] != ELEM_SIZE {
        return Err(predicate_error(op, "y.strides()[0] == ELEM_SIZE", &[("Y", y)]));
    }
    let expected = [y.dims()[1], x.dims()[1], y.dims()[2], y.dims()[3]];
    if *r.dims() != expected {
        return Err(predicate_error(
            op,
            "r.dims() == [y.rows, x.rows, y.d2, y.d3]",
            &[("R", r), ("X", x), ("Y", y)],
        ));
    }
    if !r.shape().is_dense() {
        return Err(predicate_error(op, "r.is_dense()", &[("R", r)]));
    }
    if storage_overlaps(r, x) || storage_overlaps(r, y) {
        return Err(predicate_error(
            op,
            "r storage disjoint from x and y",
            &[("R", r), ("X", x), ("Y", y)],
        ));
    }
    Ok(())
}

/// Dispatches the validator matching a DAG node's opcode.
///
/// Also checks the recorded operand count against the opcode's arity; a
/// `Nop` node always validates.
pub fn validate_node(t: &Tensor) -> Result<(), ValidationError> {
    let op = t.opcode();
    let operands = t.operands();
    if operands.len() != op.arity() {
        return Err(ValidationError::OperandCount {
            op,
            expected: op.arity(),
            actual: operands.len(),
        });
    }
    match op {
        OpCode::Nop => Ok(()),
        OpCode::Softmax
        | OpCode::Sigmoid
        | OpCode::Tanh
        | OpCode::Relu
        | OpCode::Gelu
        | OpCode::Silu => validate_unary(op, t, &operands[0]),
        OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
            validate_binary(op, t, &operands[0], &operands[1])
        }
        OpCode::MatMul => validate_matmul(t, &operands[0], &operands[1]),
    }
}

/// Escalates a validation failure to a fatal error.
///
/// A predicate that fails at evaluation time signals a programming error,
/// not user input; this logs the diagnostic and aborts instead of letting
/// the caller continue with an unchecked kernel.
pub(crate) fn enforce(result: Result<(), ValidationError>) {
    if let Err(err) = result {
        tracing::error!("{err}");
        panic!("{err}");
    }
}
