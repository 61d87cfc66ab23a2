// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The opcode taxonomy of the computation graph.
//!
//! Every tensor records the opcode that produces it; a leaf records
//! [`OpCode::Nop`]. Arity and display names live in compile-time constant
//! tables indexed by the opcode discriminant — any opcode addition must
//! extend all three lists (the table-consistency test below catches a
//! mismatch).

use std::fmt;

/// Operation codes, in table order: nullary, then unary, then binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[repr(u32)]
pub enum OpCode {
    /// Leaf tensor (input or parameter); no operands.
    Nop = 0,
    /// Exponential numerator of softmax; normalization is the caller's phase.
    Softmax,
    Sigmoid,
    Tanh,
    Relu,
    Gelu,
    Silu,
    Add,
    Sub,
    Mul,
    Div,
    MatMul,
}

/// Operand counts, indexed by opcode discriminant.
const ARITY: [usize; OpCode::COUNT] = [0, 1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2];

/// Display mnemonics, indexed by opcode discriminant.
const NAMES: [&str; OpCode::COUNT] = [
    "nop", "softmax", "sigmoid", "tanh", "relu", "gelu", "silu", "+", "-", "*", "/", "matmul",
];

impl OpCode {
    /// Number of opcodes.
    pub const COUNT: usize = 12;

    /// Every opcode, in table order.
    pub const ALL: [OpCode; OpCode::COUNT] = [
        OpCode::Nop,
        OpCode::Softmax,
        OpCode::Sigmoid,
        OpCode::Tanh,
        OpCode::Relu,
        OpCode::Gelu,
        OpCode::Silu,
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::MatMul,
    ];

    /// Returns the number of operands this opcode takes (0, 1 or 2).
    pub const fn arity(self) -> usize {
        ARITY[self as usize]
    }

    /// Returns the display mnemonic.
    pub const fn name(self) -> &'static str {
        NAMES[self as usize]
    }

    /// `true` for single-operand opcodes.
    pub const fn is_unary(self) -> bool {
        self.arity() == 1
    }

    /// `true` for two-operand opcodes.
    pub const fn is_binary(self) -> bool {
        self.arity() == 2
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
