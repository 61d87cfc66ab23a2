// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Topological graph evaluation.
//!
//! The DAG is implicit: every tensor records its opcode and operands, so a
//! depth-first post-order walk from the root visits operand subgraphs before
//! the node that consumes them. The walk is memoized on node identity: a
//! subexpression shared by several parents is validated and evaluated
//! exactly once per [`compute`] call.
//!
//! Siblings are visited left-to-right by default; [`EvalOrder::RightToLeft`]
//! flips the order, which cannot change any result (subgraphs only write
//! their own result tensors) but is kept selectable for traversal-sensitive
//! tooling.

use crate::validate;
use compute_kernels::{elementwise, gemm, ComputeCtx};
use std::collections::HashSet;
use tensor_core::{OpCode, TensorRef};

/// Sibling visit order of the depth-first walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EvalOrder {
    /// Operand 0 first. The default.
    #[default]
    LeftToRight,
    /// Operand 1 first.
    RightToLeft,
}

/// Evaluates the DAG rooted at `root` on the calling thread.
///
/// Every reachable non-leaf node is validated and dispatched to its kernel
/// with the single-threaded compute context, operands before consumers.
///
/// # Panics
/// Panics when a node fails validation; see the crate's error-handling
/// notes.
///
/// # Example
/// ```
/// use runtime::{compute, init_runtime, ArenaCapacity, ComputeDevice, Isolate};
///
/// init_runtime();
/// let iso = Isolate::create("graph-doc", ComputeDevice::Cpu, ArenaCapacity::from_kib(16));
/// let a = iso.new_tensor_with_data(&[2], &[1.0, 2.0]);
/// let b = iso.new_tensor_with_data(&[2], &[3.0, 4.0]);
/// let c = &a + &b;
/// compute(&c);
/// assert_eq!(c.data(), &[4.0, 6.0]);
/// ```
pub fn compute(root: &TensorRef) {
    compute_with_order(root, EvalOrder::LeftToRight);
}

/// [`compute`] with an explicit sibling visit order.
pub fn compute_with_order(root: &TensorRef, order: EvalOrder) {
    let ctx = ComputeCtx::single_threaded();
    let mut visited = HashSet::new();
    visit(root, order, &mut visited, &ctx);
}

/// Post-order walk with memoization on node identity.
fn visit(node: &TensorRef, order: EvalOrder, visited: &mut HashSet<usize>, ctx: &ComputeCtx) {
    if node.opcode() == OpCode::Nop {
        return;
    }
    if !visited.insert(node.node_id()) {
        return;
    }
    let operands = node.operands();
    match order {
        EvalOrder::LeftToRight => {
            for operand in operands {
                visit(operand, order, visited, ctx);
            }
        }
        EvalOrder::RightToLeft => {
            for operand in operands.iter().rev() {
                visit(operand, order, visited, ctx);
            }
        }
    }
    dispatch(node, ctx);
}

/// Validates a node and runs its kernel.
fn dispatch(node: &TensorRef, ctx: &ComputeCtx) {
    validate::enforce(validate::validate_node(node));
    let operands = node.operands();
    match node.opcode() {
        OpCode::Nop => {}
        OpCode::Softmax => elementwise::softmax(ctx, node, &operands[0]),
        OpCode::Sigmoid => elementwise::sigmoid(ctx, node, &operands[0]),
        OpCode::Tanh => elementwise::tanh(ctx, node, &operands[0]),
        OpCode::Relu => elementwise::relu(ctx, node, &operands[0]),
        OpCode::Gelu => elementwise::gelu(ctx, node, &operands[0]),
        OpCode::Silu => elementwise::silu(ctx, node, &operands[0]),
        OpCode::Add => elementwise::add(ctx, node, &operands[0], &operands[1]),
        OpCode::Sub => elementwise::sub(ctx, node, &operands[0], &operands[1]),
        OpCode::Mul => elementwise::mul(ctx, node, &operands[0], &operands[1]),
        OpCode::Div => elementwise::div(ctx, node, &operands[0], &operands[1]),
        OpCode::MatMul => gemm::matmul(ctx, node, &operands[0], &operands[1]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tensor_arena::ArenaCapacity;
    use tensor_core::{init_runtime, ComputeDevice, Isolate, IsolateRef};

    fn isolate(name: &str) -> IsolateRef {
        init_runtime();
        Isolate::create(name, ComputeDevice::Cpu, ArenaCapacity::from_kib(64))
    }

    #[test]
    fn test_leaf_root_is_noop() {
        let iso = isolate("graph-leaf");
        let a = iso.new_tensor_with_data(&[2], &[1.0, 2.0]);
        compute(&a);
        assert_eq!(a.data(), &[1.0, 2.0]);
    }

    #[test]
    fn test_single_binary_node() {
        let iso = isolate("graph-add");
        let a = iso.new_tensor_with_data(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
        let b = iso.new_tensor_with_data(&[2, 2], &[10.0, 20.0, 30.0, 40.0]);
        let c = &a + &b;
        compute(&c);
        assert_eq!(c.data(), &[11.0, 22.0, 33.0, 44.0]);
    }

    #[test]
    fn test_shared_subexpression_diamond() {
        let iso = isolate("graph-diamond");
        let a = iso.new_tensor(&[4, 4]);
        let b = iso.new_tensor(&[4, 4]);
        a.fill_one();
        b.fill_one();
        // c feeds three consumers; the memoized walk evaluates it once.
        let c = &a + &b;
        let e = &c * &c;
        let f = &e - &c;
        let g = &f * &c;
        compute(&g);
        for &v in g.data() {
            assert_eq!(v, 4.0);
        }
        // Intermediate results are observable too.
        assert!(c.data().iter().all(|&v| v == 2.0));
        assert!(e.data().iter().all(|&v| v == 4.0));
        assert!(f.data().iter().all(|&v| v == 2.0));
    }

    #[test]
    fn test_eval_orders_agree() {
        let iso = isolate("graph-order");
        let a = iso.new_tensor(&[8]);
        let b = iso.new_tensor(&[8]);
        a.fill_random_seeded(-1.0, 1.0, 31);
        b.fill_random_seeded(-1.0, 1.0, 32);
        let ltr = &(&a + &b) * &a;
        compute_with_order(&ltr, EvalOrder::LeftToRight);
        let expected = ltr.to_vec();

        let rtl = &(&a + &b) * &a;
        compute_with_order(&rtl, EvalOrder::RightToLeft);
        assert_eq!(rtl.data(), &expected[..]);
    }

    #[test]
    fn test_activation_chain() {
        let iso = isolate("graph-activations");
        let a = iso.new_tensor_with_data(&[4], &[-2.0, -1.0, 1.0, 2.0]);
        let out = a.relu().sigmoid();
        compute(&out);
        for i in 0..4 {
            let expected = 1.0 / (1.0 + (-a.get_flat(i).max(0.0)).exp());
            assert_eq!(out.get_flat(i), expected);
        }
    }

    #[test]
    fn test_matmul_node_evaluates() {
        let iso = isolate("graph-matmul");
        let x = iso.new_tensor_with_data(&[3, 2], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let y = iso.new_tensor_with_data(&[3, 2], &[1.0, 0.0, 0.0, 0.0, 1.0, 0.0]);
        let r = x.matmul(&y);
        compute(&r);
        // Y rows are e0 and e1: R(n, m) = X(n, m).
        assert_eq!(r.data(), &[1.0, 2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_recompute_after_leaf_update() {
        let iso = isolate("graph-recompute");
        let a = iso.new_tensor_with_data(&[2], &[1.0, 1.0]);
        let b = iso.new_tensor_with_data(&[2], &[2.0, 2.0]);
        let c = &a * &b;
        compute(&c);
        assert_eq!(c.data(), &[2.0, 2.0]);
        a.fill(3.0);
        compute(&c);
        assert_eq!(c.data(), &[6.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "validation failed")]
    fn test_invalid_node_aborts() {
        let iso = isolate("graph-invalid");
        // A broadcast that does not divide: 3 does not repeat onto 4.
        let a = iso.new_tensor(&[4]);
        let b = iso.new_tensor(&[3]);
        let c = &a + &b;
        compute(&c);
    }
}
